//! Canonicalization of raw ISRC values.
//!
//! Two keys are equal iff their canonical forms are byte-equal; all matching
//! and indexing in this crate goes through [`normalize_key`].

/// Maps a raw key value to its canonical form: trimmed, uppercased, with an
/// absent value treated as the empty string. Total and idempotent.
pub fn normalize_key(raw: Option<&str>) -> String {
    match raw {
        Some(s) => s.trim().to_uppercase(),
        None => String::new(),
    }
}
