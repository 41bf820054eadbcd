//! Domain services for osreport.
//!
//! This crate sits between the transport layers (HTTP server, CLI) and the
//! infrastructure crates:
//!
//! - **Refresh orchestration**: runs a collector in the background, streams
//!   progress through a session and persists the result exactly once
//! - **Report reads**: serves the stored report, fetching synchronously when
//!   nothing is stored yet
//! - **Filtering**: narrows a report and recomputes its summary
//!
//! # Example
//!
//! ```ignore
//! use osreport_domain::{DomainServices, FilterCriteria};
//!
//! let services = DomainServices::new(collector, store, registry, retention);
//!
//! let session_id = services.refresh().run_async();
//! let stream = services.stream_progress(&session_id)?;
//! ```

mod error;
pub mod filter;
pub mod services;

pub use error::{DomainError, Result};
pub use filter::{FilterCriteria, FilterQuery, filter_report, split_list};
pub use services::DomainServices;
pub use services::progress::progress_stream;
pub use services::refresh::RefreshService;
pub use services::report::{ProjectList, ReportService, StoreStatus, format_age};

// Re-export key types from infrastructure crates for convenience
pub use osreport_collector::{CollectionError, Collector, SharedCollector};
pub use osreport_session::{ProgressOutlet, ProgressSubscription, SessionRegistry};
pub use osreport_store::{ReportStore, StoreError};
pub use osreport_types::{ProgressMessage, Report, SessionId};
