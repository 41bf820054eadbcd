//! The collector trait.

use std::sync::Arc;

use async_trait::async_trait;
use osreport_session::ProgressOutlet;
use osreport_types::Report;

use crate::error::Result;

/// Source of complete inventory reports.
///
/// Collectors do not retry; a failure is returned to the caller as-is.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Collect a full report.
    async fn fetch_all(&self) -> Result<Report>;

    /// Collect a full report, describing progress on `outlet`.
    ///
    /// Only `progress` events are pushed; the caller owns the `start` and
    /// terminal events. Pushes never block, so a slow observer cannot stall
    /// collection.
    async fn fetch_all_with_progress(&self, outlet: &ProgressOutlet) -> Result<Report>;
}

/// A collector that can be shared across tasks.
pub type SharedCollector = Arc<dyn Collector>;
