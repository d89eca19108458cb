//! Key-indexed lookup structure over the retained reference rows.
//!
//! Built incrementally by the loader during ingestion and read-only once the
//! load finishes; the matcher only ever borrows it, so a finished index can
//! back any number of matching runs.

use crate::models::ReferenceRow;
use rustc_hash::FxHashMap;
use std::mem;

/// Mapping from canonical key to the reference rows carrying it, with
/// first-seen order preserved per key and across the whole dataset.
///
/// When no key column was identified in the header the index still holds
/// every retained row but builds no lookup table; [`is_searchable`] reports
/// that degraded state and [`lookup_first`] always misses.
///
/// [`is_searchable`]: ReferenceIndex::is_searchable
/// [`lookup_first`]: ReferenceIndex::lookup_first
#[derive(Debug)]
pub struct ReferenceIndex {
    columns: Vec<String>,
    key_column: Option<usize>,
    rows: Vec<ReferenceRow>,
    by_key: FxHashMap<String, Vec<u32>>,
    approx_bytes: u64,
}

impl ReferenceIndex {
    pub(crate) fn new(columns: Vec<String>, key_column: Option<usize>) -> Self {
        Self {
            columns,
            key_column,
            rows: Vec::new(),
            by_key: FxHashMap::default(),
            approx_bytes: 0,
        }
    }

    /// Appends one retained row. Empty keys are stored but never entered
    /// into the lookup table, so they cannot be found by key.
    pub(crate) fn push_row(&mut self, row: ReferenceRow) {
        self.approx_bytes += (row.fields.iter().map(String::len).sum::<usize>()
            + row.fields.len() * mem::size_of::<String>()
            + row.raw_key.len()
            + row.normalized_key.len()
            + mem::size_of::<ReferenceRow>()) as u64;

        let id = self.rows.len() as u32;
        if self.key_column.is_some() && !row.normalized_key.is_empty() {
            self.by_key
                .entry(row.normalized_key.clone())
                .or_default()
                .push(id);
        }
        self.rows.push(row);
    }

    /// Retained column names, in original header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of the key column within [`columns`](ReferenceIndex::columns).
    pub fn key_column(&self) -> Option<usize> {
        self.key_column
    }

    /// False when the dataset header had no key column; lookups are then
    /// impossible and the matcher will produce no results.
    pub fn is_searchable(&self) -> bool {
        self.key_column.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct non-empty canonical keys observed.
    pub fn distinct_keys(&self) -> usize {
        self.by_key.len()
    }

    /// Rough in-memory footprint in bytes, for diagnostics only.
    pub fn approx_memory_bytes(&self) -> u64 {
        self.approx_bytes
    }

    /// Returns the first-loaded row for a canonical key. Later rows with the
    /// same key are retained but never surfaced here.
    pub fn lookup_first(&self, normalized_key: &str) -> Option<&ReferenceRow> {
        if normalized_key.is_empty() {
            return None;
        }
        self.by_key
            .get(normalized_key)
            .and_then(|ids| ids.first())
            .map(|&id| &self.rows[id as usize])
    }

    /// All rows for a canonical key, in first-seen order.
    pub fn lookup_all(&self, normalized_key: &str) -> Vec<&ReferenceRow> {
        if normalized_key.is_empty() {
            return Vec::new();
        }
        self.by_key
            .get(normalized_key)
            .map(|ids| ids.iter().map(|&id| &self.rows[id as usize]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str], key: &str) -> ReferenceRow {
        ReferenceRow {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            raw_key: key.to_string(),
            normalized_key: key.to_string(),
        }
    }

    fn make_index(key_column: Option<usize>) -> ReferenceIndex {
        ReferenceIndex::new(vec!["ISRC".into(), "Share".into()], key_column)
    }

    #[test]
    fn lookup_hits_inserted_key() {
        let mut index = make_index(Some(0));
        index.push_row(row(&["ABC123", "50.0"], "ABC123"));
        let hit = index.lookup_first("ABC123").unwrap();
        assert_eq!(hit.fields[1], "50.0");
        assert!(index.lookup_first("XYZ000").is_none());
    }

    #[test]
    fn duplicate_key_first_loaded_wins() {
        let mut index = make_index(Some(0));
        index.push_row(row(&["XYZ000", "1"], "XYZ000"));
        index.push_row(row(&["XYZ000", "2"], "XYZ000"));
        assert_eq!(index.lookup_first("XYZ000").unwrap().fields[1], "1");
        let all = index.lookup_all("XYZ000");
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].fields[1], "2");
    }

    #[test]
    fn empty_key_rows_are_stored_but_unreachable() {
        let mut index = make_index(Some(0));
        index.push_row(row(&["", "10"], ""));
        assert_eq!(index.len(), 1);
        assert_eq!(index.distinct_keys(), 0);
        assert!(index.lookup_first("").is_none());
        assert!(index.lookup_all("").is_empty());
    }

    #[test]
    fn degraded_index_never_matches() {
        let mut index = make_index(None);
        index.push_row(row(&["ABC123", "50.0"], "ABC123"));
        assert!(!index.is_searchable());
        assert_eq!(index.len(), 1);
        assert!(index.lookup_first("ABC123").is_none());
    }

    #[test]
    fn distinct_keys_counts_unique_canonical_keys() {
        let mut index = make_index(Some(0));
        index.push_row(row(&["A", "1"], "A"));
        index.push_row(row(&["A", "2"], "A"));
        index.push_row(row(&["B", "3"], "B"));
        assert_eq!(index.distinct_keys(), 2);
    }

    #[test]
    fn memory_estimate_grows_with_rows() {
        let mut index = make_index(Some(0));
        assert_eq!(index.approx_memory_bytes(), 0);
        index.push_row(row(&["ABC123", "50.0"], "ABC123"));
        assert!(index.approx_memory_bytes() > 0);
    }
}
