//! Cross-referencing of an artist catalog against the reference index.
//!
//! The matcher is stateless: it borrows a finished index and an ordered
//! catalog and produces match records plus run statistics. Any number of
//! runs may share the same index.

use crate::config::{PERCENTAGE_MARKER, REFERENCE_FIELD_PREFIX};
use crate::index::ReferenceIndex;
use crate::models::{CatalogTrack, MatchRecord, RunStatistics};
use rustc_hash::FxHashSet;
use tracing::{info, warn};

/// Joins the catalog against the index by canonical key.
///
/// Tracks without a key are skipped entirely and never counted as keyed.
/// On a hit the first-loaded reference row for that key wins; later
/// duplicates are never surfaced for the same track. An empty catalog or
/// an unsearchable index yields empty results and zeroed statistics rather
/// than an error.
pub fn cross_reference(
    catalog: &[CatalogTrack],
    index: &ReferenceIndex,
) -> (Vec<MatchRecord>, RunStatistics) {
    if catalog.is_empty() {
        warn!("Catalog is empty; nothing to cross-reference");
        return (Vec::new(), RunStatistics::default());
    }
    if !index.is_searchable() {
        warn!("Reference index has no key column; no matches possible");
        return (Vec::new(), RunStatistics::default());
    }

    let distinct_collections = catalog
        .iter()
        .map(|t| t.album_name.as_str())
        .collect::<FxHashSet<_>>()
        .len();

    let mut matches = Vec::new();
    let mut tracks_with_key = 0usize;

    for track in catalog {
        let key = track.normalized_isrc();
        if key.is_empty() {
            continue;
        }
        tracks_with_key += 1;

        if let Some(row) = index.lookup_first(&key) {
            let unclaimed_fields = index
                .columns()
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != index.key_column())
                .map(|(i, name)| {
                    (
                        format!("{}{}", REFERENCE_FIELD_PREFIX, name),
                        row.fields.get(i).cloned().unwrap_or_default(),
                    )
                })
                .collect();

            matches.push(MatchRecord {
                track_name: track.track_name.clone(),
                album_name: track.album_name.clone(),
                release_date: track.release_date.clone(),
                isrc: track.isrc.clone().unwrap_or_default(),
                album_type: track.album_type.clone(),
                duration_ms: track.duration_ms,
                spotify_track_id: track.track_id.clone(),
                unclaimed_fields,
            });
        }
    }

    let matches_found = matches.len();
    let match_rate = if tracks_with_key == 0 {
        0.0
    } else {
        matches_found as f64 / tracks_with_key as f64 * 100.0
    };

    let stats = RunStatistics {
        total_catalog_tracks: catalog.len(),
        tracks_with_key,
        matches_found,
        match_rate,
        distinct_collections,
        avg_unclaimed_percentage: average_percentage(&matches),
    };

    info!(
        matches = stats.matches_found,
        checked = stats.tracks_with_key,
        match_rate = stats.match_rate,
        "Cross-reference complete"
    );

    (matches, stats)
}

/// Mean of the first percentage-named reference field across all matches,
/// skipping values that fail to parse. `None` when no such field exists or
/// nothing parsed.
fn average_percentage(matches: &[MatchRecord]) -> Option<f64> {
    let first = matches.first()?;
    let pct_pos = first
        .unclaimed_fields
        .iter()
        .position(|(name, _)| name.to_lowercase().contains(PERCENTAGE_MARKER))?;

    let values: Vec<f64> = matches
        .iter()
        .filter_map(|m| m.unclaimed_fields.get(pct_pos))
        .filter_map(|(_, v)| v.trim().parse::<f64>().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
