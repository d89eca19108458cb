use crate::normalize::normalize_key;
use serde::{Deserialize, Serialize};

/// One retained record from the reference dataset. `fields` is aligned with
/// the retained column list held by the index. Immutable once built.
#[derive(Debug, Clone)]
pub struct ReferenceRow {
    pub fields: Vec<String>,
    pub raw_key: String,
    pub normalized_key: String,
}

/// One track from an artist catalog export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub track_name: String,
    pub album_name: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub track_id: String,
}

impl CatalogTrack {
    pub fn normalized_isrc(&self) -> String {
        normalize_key(self.isrc.as_deref())
    }
}

/// A catalog track merged with the reference row it matched. Reference
/// fields carry a namespace prefix so they never collide with catalog
/// fields.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub track_name: String,
    pub album_name: String,
    pub release_date: String,
    pub isrc: String,
    pub album_type: String,
    pub duration_ms: u64,
    pub spotify_track_id: String,
    /// `(prefixed column name, value)` pairs from the matched reference
    /// row, key column excluded, index column order preserved
    pub unclaimed_fields: Vec<(String, String)>,
}

/// Aggregates computed once per matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    pub total_catalog_tracks: usize,
    pub tracks_with_key: usize,
    pub matches_found: usize,
    /// Percentage of keyed tracks that matched; exactly 0 when no track
    /// carries a key
    pub match_rate: f64,
    pub distinct_collections: usize,
    pub avg_unclaimed_percentage: Option<f64>,
}
