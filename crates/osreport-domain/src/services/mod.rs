//! Domain services.
//!
//! This module contains the services that orchestrate refreshes and serve
//! reports.

pub mod progress;
pub mod refresh;
pub mod report;

use std::sync::Arc;
use std::time::Duration;

use futures_core::Stream;
use osreport_collector::SharedCollector;
use osreport_session::SessionRegistry;
use osreport_store::ReportStore;
use osreport_types::{ProgressMessage, Report, SessionId};
use tracing::info;

use crate::error::Result;
use crate::filter::FilterCriteria;

/// Domain services facade.
///
/// The main entry point for transport layers. Cheap to clone.
#[derive(Clone)]
pub struct DomainServices {
    refresh: refresh::RefreshService,
    reports: report::ReportService,
    registry: SessionRegistry,
}

impl DomainServices {
    /// Wire the services around one collector, store and registry.
    pub fn new(
        collector: SharedCollector,
        store: Arc<dyn ReportStore>,
        registry: SessionRegistry,
        retention: Duration,
    ) -> Self {
        info!(
            collector = collector.name(),
            retention_secs = retention.as_secs(),
            "Initializing domain services"
        );

        let refresh = refresh::RefreshService::new(collector, store.clone(), registry.clone())
            .with_retention(retention);
        let reports = report::ReportService::new(store, refresh.clone());

        Self {
            refresh,
            reports,
            registry,
        }
    }

    /// Get the refresh service.
    pub fn refresh(&self) -> &refresh::RefreshService {
        &self.refresh
    }

    /// Get the report service.
    pub fn reports(&self) -> &report::ReportService {
        &self.reports
    }

    /// Get the session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Start a background refresh.
    pub fn start_refresh(&self) -> SessionId {
        self.refresh.run_async()
    }

    /// Refresh and wait for the result.
    pub async fn refresh_now(&self) -> Result<Report> {
        self.refresh.run_sync().await
    }

    /// The current report narrowed by `criteria`.
    pub async fn get_report(&self, criteria: &FilterCriteria) -> Result<Report> {
        self.reports.get_report(criteria).await
    }

    /// Attach to a running refresh's progress.
    pub fn stream_progress(
        &self,
        session_id: &SessionId,
    ) -> Result<impl Stream<Item = ProgressMessage> + Send + use<>> {
        let subscription = self.registry.attach(session_id)?;
        Ok(progress::progress_stream(subscription))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;
    use futures::StreamExt;
    use osreport_collector::MockCollector;
    use osreport_store::{DEFAULT_BACKUP_RETENTION, MemoryReportStore};
    use osreport_types::{ProgressKind, Resource, ResourceType, type_counts};

    fn report(n: usize, project: &str) -> Report {
        Report::new(
            Vec::new(),
            (0..n)
                .map(|i| {
                    Resource::new(format!("{project}-{i}"), ResourceType::Volume)
                        .with_project(project, project)
                })
                .collect(),
        )
    }

    fn services(collector: MockCollector, store: Arc<MemoryReportStore>) -> DomainServices {
        DomainServices::new(
            Arc::new(collector),
            store,
            SessionRegistry::default(),
            DEFAULT_BACKUP_RETENTION,
        )
    }

    #[tokio::test]
    async fn test_start_stream_complete() {
        let store = Arc::new(MemoryReportStore::new());
        let collector = MockCollector::new(report(5, "p1")).with_delay(std::time::Duration::from_millis(20));
        let services = services(collector, store.clone());

        let id = services.start_refresh();
        let events: Vec<_> = services.stream_progress(&id).unwrap().collect().await;

        let last = events.last().unwrap();
        assert_eq!(last.kind, ProgressKind::Complete);
        assert_eq!(
            last.summary.as_ref().unwrap(),
            &type_counts(&store.load().unwrap().resources)
        );
    }

    #[tokio::test]
    async fn test_progress_stream_outlives_borrowed_id() {
        let store = Arc::new(MemoryReportStore::new());
        let services = services(MockCollector::new(report(2, "p1")), store);

        let stream = {
            let id = services.start_refresh();
            services.stream_progress(&id).unwrap()
        };
        let events: Vec<_> = tokio::spawn(stream.collect::<Vec<_>>()).await.unwrap();
        assert_eq!(events.last().unwrap().kind, ProgressKind::Complete);
    }

    #[tokio::test]
    async fn test_stream_unknown_session() {
        let services = services(MockCollector::new(report(1, "p1")), Arc::new(MemoryReportStore::new()));

        let err = services
            .stream_progress(&SessionId::from("session_nope"))
            .err()
            .unwrap();
        assert!(matches!(err, DomainError::SessionNotFound(ref id) if id == "session_nope"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_refreshes_are_independent() {
        let store = Arc::new(MemoryReportStore::new());
        let collector = MockCollector::with_reports(vec![report(2, "a"), report(3, "b")])
            .with_delay(std::time::Duration::from_millis(30));
        let services = services(collector, store.clone());

        let first = services.start_refresh();
        let second = services.start_refresh();
        assert_ne!(first, second);

        let s1 = services.stream_progress(&first).unwrap();
        let s2 = services.stream_progress(&second).unwrap();
        let (e1, e2): (Vec<_>, Vec<_>) = tokio::join!(s1.collect(), s2.collect());

        for events in [&e1, &e2] {
            assert_eq!(events.iter().filter(|m| m.is_terminal()).count(), 1);
            assert_eq!(events.last().unwrap().kind, ProgressKind::Complete);
        }

        let totals: Vec<usize> = [&e1, &e2]
            .iter()
            .map(|events| events.last().unwrap().summary.as_ref().unwrap().values().sum())
            .collect();
        let mut sorted = totals.clone();
        sorted.sort();
        assert_eq!(sorted, vec![2, 3]);

        // Whichever refresh promoted last is the stored one
        let stored = store.load().unwrap().len();
        assert!(stored == 2 || stored == 3);
        assert_eq!(store.backup_count(), 1);
    }
}
