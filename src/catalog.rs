//! Artist catalog loading.
//!
//! The matcher only needs an ordered list of [`CatalogTrack`]; where it came
//! from is not its concern. This module reads the JSON export produced by a
//! catalog fetch (one array of track objects).

use crate::models::CatalogTrack;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub fn load_catalog(path: &Path) -> Result<Vec<CatalogTrack>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog file: {}", path.display()))?;
    let tracks: Vec<CatalogTrack> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse catalog JSON: {}", path.display()))?;

    info!(tracks = tracks.len(), "Catalog loaded");
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_track_array() {
        let json = r#"[
            {
                "track_name": "Yellow",
                "album_name": "Parachutes",
                "release_date": "2000-07-10",
                "isrc": "GBAYE0000724",
                "album_type": "album",
                "duration_ms": 266773,
                "track_id": "3AJwUDP919kvQ9QcozQPxg"
            },
            {
                "track_name": "Untitled Demo",
                "album_name": "Parachutes",
                "track_id": "x1"
            }
        ]"#;
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(json.as_bytes()).unwrap();

        let tracks = load_catalog(tmp.path()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].normalized_isrc(), "GBAYE0000724");
        // Optional fields default rather than failing the whole file.
        assert_eq!(tracks[1].isrc, None);
        assert_eq!(tracks[1].duration_ms, 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open catalog file"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"{not json").unwrap();
        assert!(load_catalog(tmp.path()).is_err());
    }
}
