//! Read access to the stored report.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use osreport_store::ReportStore;
use osreport_types::{Project, Report};
use tracing::{debug, info};

use crate::error::{DomainError, Result};
use crate::filter::{FilterCriteria, filter_report};
use crate::services::refresh::RefreshService;

/// Projects in the current report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectList {
    pub projects: Vec<Project>,
    pub total: usize,
    pub generated_at: DateTime<Utc>,
}

/// Metadata about the stored report.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatus {
    pub exists: bool,
    pub age: Option<Duration>,
    pub last_update: Option<DateTime<Utc>>,
    pub size_bytes: Option<u64>,
}

impl StoreStatus {
    pub fn age_seconds(&self) -> Option<u64> {
        self.age.map(|a| a.as_secs())
    }

    pub fn age_hours(&self) -> Option<f64> {
        self.age.map(|a| a.as_secs_f64() / 3600.0)
    }

    /// Age rendered for people, e.g. "3 hours".
    pub fn age_human(&self) -> Option<String> {
        self.age.map(format_age)
    }
}

/// Serves the stored report, fetching one when nothing is stored.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    refresh: RefreshService,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, refresh: RefreshService) -> Self {
        Self { store, refresh }
    }

    /// The current report, or a freshly collected one if none is stored.
    ///
    /// Only a missing (or unreadable-as-a-report) snapshot triggers the
    /// fallback fetch; other storage errors are returned.
    pub async fn current(&self) -> Result<Report> {
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| DomainError::Internal(format!("report load task failed: {}", e)))?;

        match loaded {
            Ok(report) => Ok(report),
            Err(e) if e.is_not_found() => {
                info!(reason = %e, "No stored report, collecting one now");
                self.refresh.run_sync().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The current report narrowed by `criteria`.
    pub async fn get_report(&self, criteria: &FilterCriteria) -> Result<Report> {
        let report = self.current().await?;
        let filtered = filter_report(&report, criteria);
        debug!(
            total = report.len(),
            matched = filtered.len(),
            "Report filtered"
        );
        Ok(filtered)
    }

    /// Projects of the current report.
    pub async fn get_projects(&self) -> Result<ProjectList> {
        let report = self.current().await?;
        Ok(ProjectList {
            total: report.projects.len(),
            generated_at: report.generated_at,
            projects: report.projects,
        })
    }

    /// Metadata about the stored report. Never triggers a fetch.
    pub fn store_status(&self) -> StoreStatus {
        match self.store.snapshot_info() {
            Some(info) => StoreStatus {
                exists: true,
                age: Some(
                    SystemTime::now()
                        .duration_since(info.modified_at)
                        .unwrap_or(Duration::ZERO),
                ),
                last_update: Some(DateTime::<Utc>::from(info.modified_at)),
                size_bytes: Some(info.size_bytes),
            },
            None => StoreStatus {
                exists: false,
                age: None,
                last_update: None,
                size_bytes: None,
            },
        }
    }
}

/// Render a duration coarsely, in the largest whole unit.
pub fn format_age(age: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = age.as_secs();
    let (n, unit) = if secs < MINUTE {
        return "less than a minute".to_string();
    } else if secs < HOUR {
        (secs / MINUTE, "minute")
    } else if secs < DAY {
        (secs / HOUR, "hour")
    } else {
        (secs / DAY, "day")
    };

    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
