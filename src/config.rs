/// Default number of rows gathered into one row group during ingestion
pub const DEFAULT_CHUNK_SIZE: usize = 500_000;

/// Fallback column count when keyword pruning matches nothing
pub const COLUMN_FALLBACK_COUNT: usize = 10;

/// Case-insensitive substrings marking a column as essential to retain
pub const ESSENTIAL_KEYWORDS: &[&str] = &[
    "isrc", "title", "artist", "work", "share", "right", "resource", "duration",
];

/// Substring identifying the match-key column in the dataset header
pub const KEY_COLUMN_MARKER: &str = "isrc";

/// Prefix applied to reference fields merged into a match record
pub const REFERENCE_FIELD_PREFIX: &str = "unclaimed_";

/// Column-name substring whose values are averaged across matches
pub const PERCENTAGE_MARKER: &str = "percentage";

/// Buffer size for the dataset reader
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Buffer size for report CSV writers
pub const WRITE_BUFFER_SIZE: usize = 128 * 1024;

/// Tuning knobs for one ingestion run, passed explicitly to the loader.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Rows per row group; bounds peak memory for not-yet-indexed data
    pub chunk_size: usize,
    /// Keyword allowlist driving column pruning
    pub keywords: Vec<String>,
    /// Prune columns down to the keyword matches before reading rows
    pub prune_columns: bool,
    /// Drop rows whose normalized key is empty
    pub filter_invalid: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            keywords: ESSENTIAL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            prune_columns: true,
            filter_invalid: true,
        }
    }
}
