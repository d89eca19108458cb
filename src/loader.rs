//! Chunked ingestion of the reference dataset.
//!
//! The dataset is a tab-delimited file that can run to several gigabytes, so
//! it is never materialized wholesale: rows stream through in fixed-size row
//! groups, each projected down to the selected columns, key-normalized, and
//! filtered before the next group is read. Peak memory is bounded by one row
//! group of pending rows plus the index built so far.
//!
//! Failure policy: a missing or unreadable file aborts the load and no
//! partial index escapes. A row that fails to decode is dropped and counted.
//! A header with no key column degrades the load to an unsearchable index
//! rather than failing it.

use crate::columns::{select_columns, ColumnSelection};
use crate::config::{LoadConfig, READ_BUFFER_SIZE};
use crate::index::ReferenceIndex;
use crate::models::ReferenceRow;
use crate::normalize::normalize_key;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, warn};

/// Lifecycle of one loader instance. There is no way back out of
/// `Loaded` or `Failed`; a loader is good for exactly one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

/// Snapshot handed to the progress callback after each flushed row group.
#[derive(Debug, Clone)]
pub struct ChunkProgress {
    /// 1-based row-group number
    pub chunk: usize,
    /// Rows retained so far across all groups
    pub rows_retained: u64,
    /// Distinct canonical keys seen so far
    pub distinct_keys: usize,
}

/// Diagnostics for one completed load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_retained: u64,
    pub distinct_keys: usize,
    /// Rows dropped because their normalized key was empty
    pub rows_missing_key: u64,
    /// Rows dropped because they failed to decode
    pub rows_undecodable: u64,
    pub chunks_processed: usize,
    pub approx_memory_bytes: u64,
    /// True when no key column was found; the index cannot be searched
    pub degraded: bool,
}

type ProgressFn = Box<dyn Fn(&ChunkProgress)>;

/// Streams the reference dataset into a [`ReferenceIndex`].
pub struct DatasetLoader {
    path: PathBuf,
    config: LoadConfig,
    state: LoadState,
    on_chunk: Option<ProgressFn>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>, config: LoadConfig) -> Self {
        Self {
            path: path.into(),
            config,
            state: LoadState::NotStarted,
            on_chunk: None,
        }
    }

    /// Registers a callback invoked after each flushed row group. The core
    /// never prints progress itself; callers decide how to surface it.
    pub fn with_progress(mut self, f: impl Fn(&ChunkProgress) + 'static) -> Self {
        self.on_chunk = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Runs the full ingestion and returns the finalized index with its
    /// diagnostics. Fatal only on I/O failure; callers must still inspect
    /// [`LoadReport::degraded`] before relying on key lookups.
    pub fn load(&mut self) -> Result<(ReferenceIndex, LoadReport)> {
        if self.state != LoadState::NotStarted {
            bail!("dataset loader cannot be reused (state: {:?})", self.state);
        }
        self.state = LoadState::Loading;
        match self.run() {
            Ok(out) => {
                self.state = LoadState::Loaded;
                Ok(out)
            }
            Err(e) => {
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    fn run(&self) -> Result<(ReferenceIndex, LoadReport)> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open reference dataset: {}", self.path.display()))?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(BufReader::with_capacity(READ_BUFFER_SIZE, file));

        let header: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read dataset header: {}", self.path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        let selection = select_columns(&header, &self.config.keywords, self.config.prune_columns);
        info!(
            total_columns = header.len(),
            retained_columns = selection.columns.len(),
            "Column selection complete"
        );

        let mut report = LoadReport {
            degraded: selection.key_position.is_none(),
            ..Default::default()
        };
        if report.degraded {
            warn!(
                columns = ?selection.columns,
                "No ISRC column found; loading without key filtering or indexing"
            );
        }

        let mut index = ReferenceIndex::new(selection.columns.clone(), selection.key_position);
        let mut pending: Vec<ReferenceRow> = Vec::with_capacity(self.config.chunk_size.min(65_536));
        let mut record = csv::StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    if let Some(row) = self.project_row(&record, &selection, &mut report) {
                        pending.push(row);
                        if pending.len() >= self.config.chunk_size {
                            flush_chunk(&mut pending, &mut index, &mut report, self.on_chunk.as_deref());
                        }
                    }
                }
                Err(e) => match e.kind() {
                    // A read failure mid-file means the source itself is bad;
                    // no partial index must escape.
                    csv::ErrorKind::Io(_) => {
                        return Err(e).with_context(|| {
                            format!("I/O error reading reference dataset: {}", self.path.display())
                        });
                    }
                    _ => report.rows_undecodable += 1,
                },
            }
        }

        if !pending.is_empty() {
            flush_chunk(&mut pending, &mut index, &mut report, self.on_chunk.as_deref());
        }

        report.approx_memory_bytes = index.approx_memory_bytes();
        info!(
            rows = report.rows_retained,
            distinct_keys = report.distinct_keys,
            dropped_missing_key = report.rows_missing_key,
            dropped_undecodable = report.rows_undecodable,
            chunks = report.chunks_processed,
            memory_mb = report.approx_memory_bytes / (1024 * 1024),
            "Reference index built"
        );

        Ok((index, report))
    }

    /// Projects one raw record down to the retained columns. Returns `None`
    /// when the invalid-row filter discards it.
    fn project_row(
        &self,
        record: &csv::StringRecord,
        selection: &ColumnSelection,
        report: &mut LoadReport,
    ) -> Option<ReferenceRow> {
        let raw_key = selection
            .key_position
            .map(|k| record.get(selection.positions[k]).unwrap_or(""))
            .unwrap_or("");
        let normalized_key = normalize_key(Some(raw_key));

        // Filtering only applies when a key column exists; degraded mode
        // keeps every row.
        if self.config.filter_invalid && selection.key_position.is_some() && normalized_key.is_empty()
        {
            report.rows_missing_key += 1;
            return None;
        }

        let fields = selection
            .positions
            .iter()
            .map(|&i| record.get(i).unwrap_or("").to_string())
            .collect();

        Some(ReferenceRow {
            fields,
            raw_key: raw_key.to_string(),
            normalized_key,
        })
    }
}

fn flush_chunk(
    pending: &mut Vec<ReferenceRow>,
    index: &mut ReferenceIndex,
    report: &mut LoadReport,
    on_chunk: Option<&dyn Fn(&ChunkProgress)>,
) {
    report.rows_retained += pending.len() as u64;
    for row in pending.drain(..) {
        index.push_row(row);
    }
    report.chunks_processed += 1;
    report.distinct_keys = index.distinct_keys();

    if let Some(f) = on_chunk {
        f(&ChunkProgress {
            chunk: report.chunks_processed,
            rows_retained: report.rows_retained,
            distinct_keys: report.distinct_keys,
        });
    }
}
