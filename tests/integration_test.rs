//! End-to-end tests for the rightscan cross-reference pipeline.
//!
//! These tests exercise the complete data flow: a tab-delimited reference
//! dataset on disk is streamed into an index, an artist catalog is joined
//! against it, and the resulting matches and statistics are rendered to CSV.
//!
//! # Test Strategy
//!
//! - **Fixture creation**: datasets are written as plain TSV into temp files;
//!   catalogs are built in memory or parsed from JSON
//! - **Chunk invariance**: the same dataset is ingested at several row-group
//!   sizes and must always produce the same index and matches
//! - **Degradation**: headers without an ISRC column must load but never match
//! - **Isolation**: each test uses its own temp files and directories

use rightscan::catalog::load_catalog;
use rightscan::config::LoadConfig;
use rightscan::loader::{DatasetLoader, LoadState};
use rightscan::matcher::cross_reference;
use rightscan::models::CatalogTrack;
use rightscan::report::write_report;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write_tsv(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(contents.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn track(name: &str, album: &str, isrc: Option<&str>) -> CatalogTrack {
    CatalogTrack {
        track_name: name.to_string(),
        album_name: album.to_string(),
        release_date: "2000-07-10".to_string(),
        isrc: isrc.map(str::to_string),
        album_type: "album".to_string(),
        duration_ms: 266_773,
        track_id: format!("spotify-{}", name),
    }
}

fn config(chunk_size: usize) -> LoadConfig {
    LoadConfig {
        chunk_size,
        ..LoadConfig::default()
    }
}

#[test]
fn full_pipeline_produces_matches_and_report() {
    let dataset = write_tsv(
        "FeedId\tISRC\tResourceTitle\tUnclaimedRightSharePercentage\n\
         1\t abc123 \tYellow\t50.0\n\
         2\tZZZ999\tUnrelated\t10.0\n",
    );
    let mut loader = DatasetLoader::new(dataset.path(), config(500_000));
    let (index, load_report) = loader.load().unwrap();

    assert_eq!(loader.state(), LoadState::Loaded);
    assert!(!load_report.degraded);
    assert_eq!(load_report.rows_retained, 2);

    let catalog = vec![track("Yellow", "Parachutes", Some("ABC123"))];
    let (matches, stats) = cross_reference(&catalog, &index);

    assert_eq!(matches.len(), 1);
    assert_eq!(stats.match_rate, 100.0);
    assert_eq!(stats.avg_unclaimed_percentage, Some(50.0));
    assert_eq!(
        matches[0]
            .unclaimed_fields
            .iter()
            .find(|(n, _)| n == "unclaimed_UnclaimedRightSharePercentage")
            .map(|(_, v)| v.as_str()),
        Some("50.0")
    );

    let out = TempDir::new().unwrap();
    write_report(out.path().to_str().unwrap(), &matches, &stats).unwrap();

    let matches_csv = fs::read_to_string(out.path().join("matches.csv")).unwrap();
    assert!(matches_csv.contains("unclaimed_ResourceTitle"));
    assert!(matches_csv.contains("Yellow"));
    let summary_csv = fs::read_to_string(out.path().join("summary.csv")).unwrap();
    assert!(summary_csv.contains("match_rate,100.00"));
    assert!(summary_csv.contains("avg_unclaimed_percentage,50.00"));
}

#[test]
fn raw_and_catalog_keys_unify_through_normalization() {
    // Reference carries " abc123 ", catalog carries "ABC123": one match.
    let dataset = write_tsv("ISRC\tShare\n abc123 \t75.0\n");
    let mut loader = DatasetLoader::new(dataset.path(), config(500_000));
    let (index, _) = loader.load().unwrap();

    let catalog = vec![track("Song", "Album", Some("ABC123"))];
    let (matches, stats) = cross_reference(&catalog, &index);
    assert_eq!(matches.len(), 1);
    assert_eq!(stats.matches_found, 1);
}

#[test]
fn large_ingestion_chunk_count_and_key_invariance() {
    // 1,200 synthetic rows with group size 500 must flush exactly 3 groups,
    // and the distinct-key count must not depend on group boundaries.
    let mut data = String::from("ISRC\tWorkTitle\tShare\n");
    for i in 0..1_200 {
        if i % 10 == 9 {
            data.push_str(&format!("\twork{}\t1.0\n", i)); // no key
        } else {
            data.push_str(&format!("KEY{:05}\twork{}\t1.0\n", i % 400, i));
        }
    }
    let expected_retained = 1_080; // 1200 minus the 120 empty-key rows

    let dataset = write_tsv(&data);
    let mut loader = DatasetLoader::new(dataset.path(), config(500));
    let (index, report) = loader.load().unwrap();

    assert_eq!(report.chunks_processed, 3);
    assert_eq!(report.rows_retained, expected_retained);

    for chunk_size in [7, 250, 1_200, 10_000] {
        let dataset = write_tsv(&data);
        let mut loader = DatasetLoader::new(dataset.path(), config(chunk_size));
        let (other, other_report) = loader.load().unwrap();
        assert_eq!(other_report.rows_retained, expected_retained);
        assert_eq!(other.distinct_keys(), index.distinct_keys());
    }
}

#[test]
fn duplicate_keys_across_chunks_match_first_loaded_row() {
    let data = "ISRC\tValue\nXYZ000\t1\nFILL01\t8\nFILL02\t9\nXYZ000\t2\n";
    let catalog = vec![track("Song", "Album", Some("XYZ000"))];

    for chunk_size in [1, 2, 3, 100] {
        let dataset = write_tsv(data);
        let mut loader = DatasetLoader::new(dataset.path(), config(chunk_size));
        let (index, _) = loader.load().unwrap();
        let (matches, _) = cross_reference(&catalog, &index);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].unclaimed_fields[0].1, "1");
    }
}

#[test]
fn degraded_dataset_loads_but_never_matches() {
    let dataset = write_tsv("Title\tArtistName\nYellow\tColdplay\n");
    let mut loader = DatasetLoader::new(dataset.path(), LoadConfig::default());
    let (index, report) = loader.load().unwrap();

    assert!(report.degraded);
    assert!(!index.is_searchable());

    let catalog = vec![track("Yellow", "Parachutes", Some("ABC123"))];
    let (matches, stats) = cross_reference(&catalog, &index);
    assert!(matches.is_empty());
    assert_eq!(stats.matches_found, 0);
    assert_eq!(stats.tracks_with_key, 0);
}

#[test]
fn empty_dataset_with_keyed_catalog_reports_zero_rate() {
    let dataset = write_tsv("ISRC\tShare\n");
    let mut loader = DatasetLoader::new(dataset.path(), LoadConfig::default());
    let (index, report) = loader.load().unwrap();
    assert_eq!(report.rows_retained, 0);

    let catalog = vec![
        track("A", "X", Some("K1")),
        track("B", "X", Some("K2")),
        track("C", "Y", Some("K3")),
        track("D", "Y", None),
        track("E", "Z", None),
    ];
    let (matches, stats) = cross_reference(&catalog, &index);
    assert!(matches.is_empty());
    assert_eq!(stats.tracks_with_key, 3);
    assert_eq!(stats.match_rate, 0.0);
}

#[test]
fn catalog_json_flows_through_the_pipeline() {
    let dataset = write_tsv("ISRC\tRightSharePercentage\nGBAYE0000724\t33.3\n");
    let mut loader = DatasetLoader::new(dataset.path(), LoadConfig::default());
    let (index, _) = loader.load().unwrap();

    let mut catalog_file = NamedTempFile::new().unwrap();
    catalog_file
        .write_all(
            br#"[{"track_name":"Yellow","album_name":"Parachutes",
                 "release_date":"2000-07-10","isrc":"gbaye0000724",
                 "album_type":"album","duration_ms":266773,
                 "track_id":"3AJwUDP919kvQ9QcozQPxg"}]"#,
        )
        .unwrap();
    catalog_file.flush().unwrap();

    let tracks = load_catalog(catalog_file.path()).unwrap();
    let (matches, stats) = cross_reference(&tracks, &index);
    assert_eq!(matches.len(), 1);
    assert_eq!(stats.avg_unclaimed_percentage, Some(33.3));
    assert_eq!(matches[0].spotify_track_id, "3AJwUDP919kvQ9QcozQPxg");
}

#[test]
fn matcher_runs_repeatedly_against_one_index() {
    let dataset = write_tsv("ISRC\tShare\nABC123\t50.0\nDEF456\t25.0\n");
    let mut loader = DatasetLoader::new(dataset.path(), LoadConfig::default());
    let (index, _) = loader.load().unwrap();

    let first = vec![track("A", "X", Some("ABC123"))];
    let second = vec![track("B", "Y", Some("DEF456")), track("C", "Y", None)];

    let (m1, s1) = cross_reference(&first, &index);
    let (m2, s2) = cross_reference(&second, &index);
    assert_eq!(m1.len(), 1);
    assert_eq!(m2.len(), 1);
    assert_eq!(s1.matches_found, 1);
    assert_eq!(s2.tracks_with_key, 1);

    // Same catalog again: the index is read-only, results are stable.
    let (m1b, s1b) = cross_reference(&first, &index);
    assert_eq!(m1b.len(), m1.len());
    assert_eq!(s1b, s1);
}
