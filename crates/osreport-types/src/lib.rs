//! Shared types for the osreport inventory service.
//!
//! Everything that crosses a crate boundary lives here: the persisted
//! [`Report`] and its parts, the derived [`Summary`], transient
//! [`ProgressMessage`]s and the [`SessionId`] that correlates a refresh with
//! its progress outlet.

pub mod progress;
pub mod report;
pub mod session;
pub mod summary;

pub use progress::{ProgressKind, ProgressMessage};
pub use report::{ParseResourceTypeError, Project, Report, Resource, ResourceType};
pub use session::SessionId;
pub use summary::{Summary, TypeCounts, type_counts};

/// Timestamp type used across the workspace.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current UTC time.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
