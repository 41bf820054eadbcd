//! In-memory report store.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use osreport_types::Report;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::store::{CleanupReport, ReportStore, SnapshotInfo};

#[derive(Debug, Clone)]
struct Stored {
    report: Report,
    saved_at: SystemTime,
    size_bytes: u64,
}

/// A [`ReportStore`] that keeps the snapshot and its backups in memory.
///
/// Useful for tests and for embedding without a data directory. Write
/// failures can be simulated with [`MemoryReportStore::set_fail_writes`].
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    current: RwLock<Option<Stored>>,
    backups: RwLock<Vec<Stored>>,
    fail_writes: AtomicBool,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `report`.
    pub fn with_report(report: Report) -> Self {
        let store = Self::new();
        *store.current.write() = Some(stored(report, SystemTime::now()));
        store
    }

    /// Make subsequent saves fail with [`StoreError::Write`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of backups currently held.
    pub fn backup_count(&self) -> usize {
        self.backups.read().len()
    }

    /// Backed-up reports, oldest first.
    pub fn backups(&self) -> Vec<Report> {
        self.backups.read().iter().map(|b| b.report.clone()).collect()
    }

    /// Pretend the current snapshot was saved `age` ago.
    pub fn backdate(&self, age: Duration) {
        if let Some(current) = self.current.write().as_mut() {
            current.saved_at = SystemTime::now() - age;
        }
    }

    /// Insert a backup that claims to be `age` old.
    pub fn insert_backup(&self, report: Report, age: Duration) {
        self.backups
            .write()
            .push(stored(report, SystemTime::now() - age));
    }
}

impl ReportStore for MemoryReportStore {
    fn save(&self, report: &Report) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("writes disabled".to_string()));
        }

        let next = stored(report.clone(), SystemTime::now());
        let mut current = self.current.write();
        if let Some(previous) = current.replace(next) {
            self.backups.write().push(previous);
        }
        Ok(())
    }

    fn load(&self) -> Result<Report> {
        self.current
            .read()
            .as_ref()
            .map(|s| s.report.clone())
            .ok_or_else(|| StoreError::NotFound("no stored report".to_string()))
    }

    fn exists(&self) -> bool {
        self.current.read().is_some()
    }

    fn age(&self) -> Result<Duration> {
        let saved_at = self
            .current
            .read()
            .as_ref()
            .map(|s| s.saved_at)
            .ok_or_else(|| StoreError::NotFound("no stored report".to_string()))?;
        Ok(SystemTime::now()
            .duration_since(saved_at)
            .unwrap_or(Duration::ZERO))
    }

    fn snapshot_info(&self) -> Option<SnapshotInfo> {
        self.current.read().as_ref().map(|s| SnapshotInfo {
            modified_at: s.saved_at,
            size_bytes: s.size_bytes,
        })
    }

    fn cleanup_backups(&self, max_age: Duration) -> CleanupReport {
        let now = SystemTime::now();
        let mut backups = self.backups.write();
        let mut report = CleanupReport {
            checked: backups.len(),
            ..Default::default()
        };

        backups.retain(|b| {
            let age = now.duration_since(b.saved_at).unwrap_or(Duration::ZERO);
            let keep = age <= max_age;
            if !keep {
                report
                    .removed
                    .push(PathBuf::from(format!("memory:{}", b.report.generated_at)));
            }
            keep
        });
        report
    }
}

fn stored(report: Report, saved_at: SystemTime) -> Stored {
    let size_bytes = serde_json::to_vec(&report)
        .map(|v| v.len() as u64)
        .unwrap_or(0);
    Stored {
        report,
        saved_at,
        size_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osreport_types::{Resource, ResourceType};

    fn report(n: usize) -> Report {
        Report::new(
            Vec::new(),
            (0..n)
                .map(|i| Resource::new(format!("r{i}"), ResourceType::Volume))
                .collect(),
        )
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryReportStore::new();
        assert!(!store.exists());
        assert!(store.load().unwrap_err().is_not_found());
        assert!(store.snapshot_info().is_none());
    }

    #[test]
    fn test_save_rotates_previous_into_backups() {
        let store = MemoryReportStore::new();
        store.save(&report(1)).unwrap();
        store.save(&report(2)).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
        assert_eq!(store.backup_count(), 1);
        assert_eq!(store.backups()[0].len(), 1);
    }

    #[test]
    fn test_fail_writes_keeps_previous_snapshot() {
        let store = MemoryReportStore::with_report(report(1));
        store.set_fail_writes(true);

        let err = store.save(&report(5)).unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
        assert_eq!(store.load().unwrap().len(), 1);
        assert_eq!(store.backup_count(), 0);
    }

    #[test]
    fn test_backdate_changes_age() {
        let store = MemoryReportStore::with_report(report(1));
        store.backdate(Duration::from_secs(7200));
        assert!(store.age().unwrap() >= Duration::from_secs(7200));
    }

    #[test]
    fn test_cleanup_removes_only_old_backups() {
        let store = MemoryReportStore::new();
        store.insert_backup(report(1), Duration::from_secs(10 * 24 * 3600));
        store.insert_backup(report(2), Duration::from_secs(3600));

        let result = store.cleanup_backups(Duration::from_secs(7 * 24 * 3600));
        assert_eq!(result.checked, 2);
        assert_eq!(result.removed.len(), 1);
        assert_eq!(store.backups()[0].len(), 2);
    }
}
