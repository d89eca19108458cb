//! Column selection for the reference dataset.
//!
//! The selection is decided from the header alone, before any row is read,
//! so memory is bounded before ingestion starts.

use crate::config::{COLUMN_FALLBACK_COUNT, KEY_COLUMN_MARKER};

/// The set of columns retained during ingestion, in original header order.
#[derive(Debug, Clone)]
pub struct ColumnSelection {
    /// Retained column names
    pub columns: Vec<String>,
    /// Index of each retained column within the full header
    pub positions: Vec<usize>,
    /// Index of the match-key column within `columns`, if one exists
    pub key_position: Option<usize>,
}

/// Chooses which columns to retain. With pruning off, every column survives.
/// With pruning on, a column survives when its lowercased name contains any
/// lowercased keyword; if nothing matches, the first ten columns survive so
/// a non-empty header never yields an empty selection.
pub fn select_columns(header: &[String], keywords: &[String], prune: bool) -> ColumnSelection {
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut positions: Vec<usize> = if prune {
        header
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                let name = name.to_lowercase();
                lowered.iter().any(|k| name.contains(k.as_str()))
            })
            .map(|(i, _)| i)
            .collect()
    } else {
        (0..header.len()).collect()
    };

    if positions.is_empty() {
        positions = (0..header.len().min(COLUMN_FALLBACK_COUNT)).collect();
    }

    let columns: Vec<String> = positions.iter().map(|&i| header[i].clone()).collect();
    let key_position = columns
        .iter()
        .position(|name| name.to_lowercase().contains(KEY_COLUMN_MARKER));

    ColumnSelection {
        columns,
        positions,
        key_position,
    }
}
