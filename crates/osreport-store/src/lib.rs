//! Durable storage for the latest inventory report.
//!
//! The store holds exactly one current snapshot plus a set of timestamped
//! backups:
//!
//! - [`ReportStore`] is the storage seam used by the refresh and read paths
//! - [`FileReportStore`] persists to a data directory with atomic promotes
//! - [`MemoryReportStore`] keeps everything in memory (tests, embedding)
//!
//! # Example
//!
//! ```rust,ignore
//! use osreport_store::{FileReportStore, ReportStore, DEFAULT_BACKUP_RETENTION};
//!
//! let store = FileReportStore::new("/var/lib/osreport");
//! store.save(&report)?;
//! store.cleanup_backups(DEFAULT_BACKUP_RETENTION);
//! ```

mod error;
mod file;
mod memory;
mod store;

pub use error::{Result, StoreError};
pub use file::{BACKUP_DIR, BACKUP_PREFIX, FileReportStore, REPORT_FILE};
pub use memory::MemoryReportStore;
pub use store::{CleanupFailure, CleanupReport, DEFAULT_BACKUP_RETENTION, ReportStore, SnapshotInfo};
