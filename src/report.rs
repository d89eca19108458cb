//! CSV report writing.
//!
//! The core returns matches and statistics in memory; this module renders
//! them for the caller. Two files land in the output directory:
//! `matches.csv` (one row per matched track, catalog fields first, then the
//! prefixed reference fields) and `summary.csv` (statistic name/value rows).

use crate::config::WRITE_BUFFER_SIZE;
use crate::models::{MatchRecord, RunStatistics};
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

const CATALOG_HEADERS: &[&str] = &[
    "track_name",
    "album_name",
    "release_date",
    "isrc",
    "album_type",
    "duration_ms",
    "spotify_track_id",
];

pub fn write_report(
    output_dir: &str,
    matches: &[MatchRecord],
    stats: &RunStatistics,
) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir))?;

    write_matches(output_dir, matches)?;
    write_summary(output_dir, stats)?;

    info!(matches = matches.len(), output_dir, "Report written");
    Ok(())
}

fn csv_writer(path: &Path) -> Result<Writer<BufWriter<File>>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    Ok(Writer::from_writer(BufWriter::with_capacity(
        WRITE_BUFFER_SIZE,
        file,
    )))
}

fn write_matches(output_dir: &str, matches: &[MatchRecord]) -> Result<()> {
    let path = Path::new(output_dir).join("matches.csv");
    let mut writer = csv_writer(&path)?;

    // Every match in one run shares the same reference columns, so the
    // first record can supply the header tail.
    let mut header: Vec<&str> = CATALOG_HEADERS.to_vec();
    if let Some(first) = matches.first() {
        header.extend(first.unclaimed_fields.iter().map(|(name, _)| name.as_str()));
    }
    writer.write_record(&header)?;

    for m in matches {
        let mut record: Vec<String> = vec![
            m.track_name.clone(),
            m.album_name.clone(),
            m.release_date.clone(),
            m.isrc.clone(),
            m.album_type.clone(),
            m.duration_ms.to_string(),
            m.spotify_track_id.clone(),
        ];
        record.extend(m.unclaimed_fields.iter().map(|(_, value)| value.clone()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_summary(output_dir: &str, stats: &RunStatistics) -> Result<()> {
    let path = Path::new(output_dir).join("summary.csv");
    let mut writer = csv_writer(&path)?;

    let mut rows = vec![
        ("total_catalog_tracks", stats.total_catalog_tracks.to_string()),
        ("tracks_with_key", stats.tracks_with_key.to_string()),
        ("matches_found", stats.matches_found.to_string()),
        ("match_rate", format!("{:.2}", stats.match_rate)),
        ("distinct_collections", stats.distinct_collections.to_string()),
    ];
    if let Some(avg) = stats.avg_unclaimed_percentage {
        rows.push(("avg_unclaimed_percentage", format!("{:.2}", avg)));
    }

    writer.write_record(["statistic", "value"])?;
    for (name, value) in rows {
        writer.write_record([name, value.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}
