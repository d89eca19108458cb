//! Rightscan: unclaimed musical work rights cross-reference pipeline
//!
//! This crate finds, for one artist, which tracks in their commercial catalog
//! have unclaimed royalty-share records in a very large (multi-GB) reference
//! dataset, joined on the ISRC (International Standard Recording Code):
//!
//! 1. **Ingestion Pass** -- Stream the tab-delimited reference dataset in
//!    fixed-size row groups, pruning columns from the header before any row
//!    is read, normalizing keys, and dropping rows without a usable key
//! 2. **Indexing** -- Build a canonical-key lookup structure over the
//!    retained rows as each group is flushed, preserving first-seen order
//! 3. **Matching Pass** -- Join a small in-memory artist catalog against the
//!    finished index and compute run statistics
//! 4. **Reporting** -- Render matches and statistics to CSV files
//!
//! # Architecture
//!
//! The pipeline is designed for bounded memory over very large inputs:
//!
//! - **Streaming ingestion** -- Never loads the full dataset; one row group
//!   of pending rows plus the growing index is the working set
//! - **Header-driven projection** -- Columns are chosen before the first row
//!   is materialized, so unretained columns never allocate
//! - **Graceful degradation** -- A header without a key column still loads;
//!   the result is flagged unsearchable instead of failing the run
//! - **Explicit failure policy** -- Only source I/O errors abort; bad rows
//!   are dropped and counted
//!
//! # Key Modules
//!
//! - [`normalize`] -- Canonical key form (trim, uppercase, absent = empty)
//! - [`columns`] -- Column pruning and key-column detection from the header
//! - [`loader`] -- Chunked dataset reader and index builder
//! - [`index`] -- Canonical-key lookup over retained rows
//! - [`matcher`] -- Catalog join and run statistics
//! - [`catalog`] -- Artist catalog JSON loading
//! - [`report`] -- CSV report output
//! - [`models`] -- Core data types (ReferenceRow, CatalogTrack, MatchRecord)
//! - [`config`] -- Ingestion configuration and defaults
//!
//! # Example Usage
//!
//! ```bash
//! # Full run: load dataset, join catalog, write report
//! rightscan analyze -d unclaimedmusicalworkrightshares.tsv \
//!     -c coldplay_catalog.json -o output/
//!
//! # Ingest only, printing load diagnostics
//! rightscan inspect -d unclaimedmusicalworkrightshares.tsv
//! ```

pub mod catalog;
pub mod columns;
pub mod config;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod report;
