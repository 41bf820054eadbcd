//! File-backed report store.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/report.json                           current snapshot
//! <data_dir>/backups/report_YYYYmmdd_HHMMSS_ffffff.json
//! ```
//!
//! Writes go to a temporary file in the data directory which is then renamed
//! over `report.json`, so readers see either the old or the new snapshot.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{NaiveDateTime, Utc};
use osreport_types::Report;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::{CleanupFailure, CleanupReport, ReportStore, SnapshotInfo};

/// File name of the current snapshot.
pub const REPORT_FILE: &str = "report.json";

/// Directory (under the data directory) holding backups.
pub const BACKUP_DIR: &str = "backups";

/// File name prefix of backups.
pub const BACKUP_PREFIX: &str = "report_";

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Report store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    data_dir: PathBuf,
}

impl FileReportStore {
    /// Create a store rooted at `data_dir`.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the current snapshot.
    pub fn report_path(&self) -> PathBuf {
        self.data_dir.join(REPORT_FILE)
    }

    /// Path of the backup directory.
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR)
    }

    /// List backup files, oldest name first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let dir = self.backup_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read(format!(
                    "failed to list {}: {}",
                    dir.display(),
                    e
                )));
            }
        };

        let mut backups: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_backup_file(path))
            .collect();
        backups.sort();
        Ok(backups)
    }

    /// Copy the current snapshot into the backup directory.
    ///
    /// Returns `None` when there is nothing to back up.
    fn backup_current(&self) -> Result<Option<PathBuf>> {
        let current = self.report_path();
        if !current.is_file() {
            return Ok(None);
        }

        let dir = self.backup_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Write(format!("failed to create {}: {}", dir.display(), e))
        })?;

        let backup = dir.join(backup_file_name(Utc::now().naive_utc()));
        match fs::copy(&current, &backup) {
            Ok(_) => Ok(Some(backup)),
            // A concurrent save promoted over the snapshot between the check and
            // the copy; its own backup pass covers the prior snapshot.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Write(format!(
                "failed to back up {}: {}",
                current.display(),
                e
            ))),
        }
    }
}

impl ReportStore for FileReportStore {
    fn save(&self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            StoreError::Write(format!(
                "failed to create data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        let json = serde_json::to_vec_pretty(report)?;

        if let Some(backup) = self.backup_current()? {
            debug!(backup = %backup.display(), "Backed up previous report");
        }

        // The temp file lives next to the target so the rename stays on one
        // filesystem.
        let mut tmp = NamedTempFile::new_in(&self.data_dir)
            .map_err(|e| StoreError::Write(format!("failed to create temp file: {}", e)))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::Write(format!("failed to write temp file: {}", e)))?;

        let target = self.report_path();
        tmp.persist(&target).map_err(|e| {
            StoreError::Write(format!("failed to promote {}: {}", target.display(), e))
        })?;

        info!(
            path = %target.display(),
            resources = report.resources.len(),
            bytes = json.len(),
            "Report saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Report> {
        let path = self.report_path();
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(StoreError::Read(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        serde_json::from_slice(&content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Stored report is corrupt");
            StoreError::NotFound(format!("{} is not a valid report: {}", path.display(), e))
        })
    }

    fn exists(&self) -> bool {
        self.report_path().is_file()
    }

    fn age(&self) -> Result<Duration> {
        let info = self
            .snapshot_info()
            .ok_or_else(|| StoreError::NotFound("no stored report".to_string()))?;
        Ok(elapsed_since(info.modified_at))
    }

    fn snapshot_info(&self) -> Option<SnapshotInfo> {
        let metadata = fs::metadata(self.report_path()).ok()?;
        if !metadata.is_file() {
            return None;
        }
        Some(SnapshotInfo {
            modified_at: metadata.modified().ok()?,
            size_bytes: metadata.len(),
        })
    }

    fn cleanup_backups(&self, max_age: Duration) -> CleanupReport {
        let mut report = CleanupReport::default();

        let backups = match self.list_backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!(error = %e, "Failed to list backups");
                report.failures.push(CleanupFailure {
                    path: self.backup_dir(),
                    error: e.to_string(),
                });
                return report;
            }
        };

        let now = SystemTime::now();
        for path in backups {
            report.checked += 1;

            let stored_at = match backup_timestamp(&path) {
                Some(ts) => ts,
                None => match fs::metadata(&path).and_then(|m| m.modified()) {
                    Ok(modified) => modified,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to stat backup");
                        report.failures.push(CleanupFailure {
                            path,
                            error: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            let age = now.duration_since(stored_at).unwrap_or(Duration::ZERO);
            if age <= max_age {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), age_secs = age.as_secs(), "Removed old backup");
                    report.removed.push(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove backup");
                    report.failures.push(CleanupFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !report.removed.is_empty() || report.has_failures() {
            info!(result = %report, "Backup cleanup finished");
        }
        report
    }
}

/// Backup file name for a given UTC time.
pub(crate) fn backup_file_name(at: NaiveDateTime) -> String {
    format!(
        "{}{}.json",
        BACKUP_PREFIX,
        at.format(BACKUP_TIMESTAMP_FORMAT)
    )
}

/// Parse the storage time out of a backup file name.
fn backup_timestamp(path: &Path) -> Option<SystemTime> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.strip_suffix(".json")?;
    let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()?;
    Some(SystemTime::from(naive.and_utc()))
}

fn is_backup_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".json"))
}

fn elapsed_since(at: SystemTime) -> Duration {
    SystemTime::now().duration_since(at).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use osreport_types::{Project, Resource, ResourceType};
    use tempfile::TempDir;

    fn sample_report(n: usize) -> Report {
        let resources = (0..n)
            .map(|i| {
                Resource::new(format!("vm-{i}"), ResourceType::Server)
                    .with_project("p1", "infra")
                    .with_status("ACTIVE")
            })
            .collect();
        Report::new(vec![Project::new("p1", "infra")], resources)
    }

    fn write_backup(store: &FileReportStore, age: ChronoDuration) -> PathBuf {
        let dir = store.backup_dir();
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(backup_file_name((Utc::now() - age).naive_utc()));
        fs::write(&path, b"{}").unwrap();
        path
    }

    #[test]
    fn test_load_recomputes_stored_summary() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        let mut stale = sample_report(1);
        stale.summary = osreport_types::Summary::default();
        store.save(&stale).unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_slice(&fs::read(store.report_path()).unwrap()).unwrap();
        assert_eq!(on_disk["summary"]["total_servers"], 0);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.summary.total_servers, 1);
        assert_eq!(loaded.summary.total_projects, 1);
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        let report = sample_report(3);

        store.save(&report).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());

        assert!(!store.exists());
        assert!(store.load().unwrap_err().is_not_found());
        assert!(store.age().unwrap_err().is_not_found());
        assert!(store.snapshot_info().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        fs::write(store.report_path(), b"{ not json").unwrap();

        assert!(store.load().unwrap_err().is_not_found());
    }

    #[test]
    fn test_first_save_creates_no_backup() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path().join("nested"));

        store.save(&sample_report(1)).unwrap();

        assert!(store.exists());
        assert!(store.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_save_backs_up_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        let first = sample_report(1);
        let second = sample_report(2);

        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);

        let backups = store.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        let backed_up: Report = serde_json::from_slice(&fs::read(&backups[0]).unwrap()).unwrap();
        assert_eq!(backed_up, first);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());

        store.save(&sample_report(1)).unwrap();
        store.save(&sample_report(2)).unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![BACKUP_DIR.to_string(), REPORT_FILE.to_string()]);
    }

    #[test]
    fn test_save_to_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let store = FileReportStore::new(&blocker);

        let err = store.save(&sample_report(1)).unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
    }

    #[test]
    fn test_age_and_snapshot_info() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        store.save(&sample_report(2)).unwrap();

        let age = store.age().unwrap();
        assert!(age < Duration::from_secs(60));

        let info = store.snapshot_info().unwrap();
        assert_eq!(info.size_bytes, fs::metadata(store.report_path()).unwrap().len());
    }

    #[test]
    fn test_cleanup_removes_only_old_backups() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());

        let old = write_backup(&store, ChronoDuration::days(10));
        let older = write_backup(&store, ChronoDuration::days(30));
        let recent = write_backup(&store, ChronoDuration::days(2));
        let fresh = write_backup(&store, ChronoDuration::minutes(1));

        let report = store.cleanup_backups(Duration::from_secs(7 * 24 * 3600));

        assert_eq!(report.checked, 4);
        assert_eq!(report.removed.len(), 2);
        assert!(!report.has_failures());
        assert!(!old.exists());
        assert!(!older.exists());
        assert!(recent.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_cleanup_falls_back_to_mtime() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        fs::create_dir_all(store.backup_dir()).unwrap();
        let odd = store.backup_dir().join("report_manual-copy.json");
        fs::write(&odd, b"{}").unwrap();

        // Just written, so it is newer than any positive retention
        let report = store.cleanup_backups(Duration::from_secs(3600));
        assert_eq!(report.checked, 1);
        assert!(report.removed.is_empty());
        assert!(odd.exists());

        let report = store.cleanup_backups(Duration::ZERO);
        // mtime granularity may make the age exactly zero
        assert!(report.removed.len() <= 1);
    }

    #[test]
    fn test_cleanup_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());
        fs::create_dir_all(store.backup_dir()).unwrap();
        let notes = store.backup_dir().join("README.txt");
        fs::write(&notes, b"keep me").unwrap();

        let report = store.cleanup_backups(Duration::ZERO);
        assert_eq!(report.checked, 0);
        assert!(notes.exists());
    }

    #[test]
    fn test_cleanup_without_backup_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileReportStore::new(dir.path());

        let report = store.cleanup_backups(Duration::ZERO);
        assert_eq!(report.checked, 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_backup_name_round_trips() {
        let at = Utc::now().naive_utc();
        let path = PathBuf::from(backup_file_name(at));
        let parsed = backup_timestamp(&path).unwrap();
        let expected = SystemTime::from(at.and_utc());
        let drift = expected
            .duration_since(parsed)
            .or_else(|_| parsed.duration_since(expected))
            .unwrap();
        assert!(drift < Duration::from_millis(1));
    }
}
