//! The report store trait and its result types.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use osreport_types::Report;

use crate::error::Result;

/// Default retention for backups (7 days).
pub const DEFAULT_BACKUP_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Storage backend for the current report.
///
/// Implementations hold a single current snapshot. Saving replaces it
/// wholesale after copying the previous snapshot into a backup; readers
/// never observe a partially written snapshot. Implementations do not retry.
pub trait ReportStore: Send + Sync {
    /// Persist `report` as the current snapshot.
    ///
    /// The previous snapshot, if any, is backed up first.
    fn save(&self, report: &Report) -> Result<()>;

    /// Load the current snapshot.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if there
    /// is no snapshot or it cannot be parsed.
    fn load(&self) -> Result<Report>;

    /// Cheap check for a current snapshot. Does not parse it.
    fn exists(&self) -> bool;

    /// Time since the snapshot was stored (not its `generated_at`).
    fn age(&self) -> Result<Duration>;

    /// Storage metadata for the current snapshot, if one exists.
    fn snapshot_info(&self) -> Option<SnapshotInfo>;

    /// Delete backups older than `max_age`.
    ///
    /// Best-effort: a failure on one backup is recorded in the report and
    /// does not stop the others from being processed.
    fn cleanup_backups(&self, max_age: Duration) -> CleanupReport;
}

/// Metadata about the stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// When the snapshot was last written.
    pub modified_at: SystemTime,
    /// Serialized size in bytes.
    pub size_bytes: u64,
}

/// Outcome of a backup cleanup pass.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Backups that were inspected.
    pub checked: usize,
    /// Backups that were removed.
    pub removed: Vec<PathBuf>,
    /// Backups (or the backup directory) that could not be processed.
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl std::fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "checked {}, removed {}, failed {}",
            self.checked,
            self.removed.len(),
            self.failures.len()
        )
    }
}

/// A single cleanup failure.
#[derive(Debug, Clone)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub error: String,
}
