//! Bidirectional transfer pipeline between a document store and a directory
//! of JSON Lines files.
//!
//! - [`Exporter`]: store → one file per matching collection
//! - [`Importer`]: directory → one recreated collection per matching file
//!
//! Both directions are driven by a [`crate::strategy::Strategy`] and report
//! progress through a [`crate::progress::ProgressReporter`]. Each unit
//! (collection/file) is prepared and written independently; a multi-unit run
//! is not atomic as a whole.

pub mod export;
pub mod import;

pub use export::Exporter;
pub use import::Importer;

use std::time::Duration;

/// Result of one export or import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    /// Number of units (collections or files) processed.
    pub units: u64,

    /// Number of records moved across all units.
    pub records: u64,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,

    /// True when the run was skipped because a precondition was absent
    /// (no store handle, or missing import directory) in non-strict mode.
    pub skipped: bool,
}

impl TransferSummary {
    /// Summary for a run skipped on a missing precondition.
    pub fn skipped() -> Self {
        Self {
            units: 0,
            records: 0,
            elapsed: Duration::ZERO,
            skipped: true,
        }
    }
}
