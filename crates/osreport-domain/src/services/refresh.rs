//! Refresh orchestration.
//!
//! A refresh collects a fresh report, persists it (with backup rotation and
//! retention cleanup) and, when run in the background, narrates its progress
//! on a session outlet that ends with exactly one terminal event.

use std::sync::Arc;
use std::time::Duration;

use osreport_collector::SharedCollector;
use osreport_session::SessionRegistry;
use osreport_store::{DEFAULT_BACKUP_RETENTION, ReportStore};
use osreport_types::{ProgressMessage, Report, SessionId, type_counts};
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// Runs refreshes against one collector and one store.
#[derive(Clone)]
pub struct RefreshService {
    collector: SharedCollector,
    store: Arc<dyn ReportStore>,
    registry: SessionRegistry,
    retention: Duration,
}

impl RefreshService {
    pub fn new(
        collector: SharedCollector,
        store: Arc<dyn ReportStore>,
        registry: SessionRegistry,
    ) -> Self {
        Self {
            collector,
            store,
            registry,
            retention: DEFAULT_BACKUP_RETENTION,
        }
    }

    /// Set the backup retention applied after each successful refresh.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Start a refresh in the background.
    ///
    /// Returns as soon as the session is registered; the id can be attached
    /// to immediately. The session is unregistered when the refresh ends,
    /// whether it succeeds, fails or panics.
    pub fn run_async(&self) -> SessionId {
        let (session_id, outlet) = self.registry.create();
        let guard = SessionGuard {
            registry: self.registry.clone(),
            id: session_id.clone(),
        };

        let collector = self.collector.clone();
        let store = self.store.clone();
        let retention = self.retention;

        info!(session_id = %session_id, collector = collector.name(), "Refresh started");

        tokio::spawn(async move {
            outlet.try_push(ProgressMessage::start("Initializing collector..."));

            match collector.fetch_all_with_progress(&outlet).await {
                Ok(report) => {
                    let counts = type_counts(&report.resources);
                    let total = report.len();
                    persist(store, Arc::new(report), retention).await;

                    outlet.try_push(ProgressMessage::complete(
                        format!("Resources refreshed successfully ({} resources)", total),
                        counts,
                    ));
                    info!(session_id = %guard.id, resources = total, "Refresh completed");
                }
                Err(e) => {
                    warn!(session_id = %guard.id, error = %e, "Refresh failed");
                    outlet.try_push(ProgressMessage::error(format!(
                        "Failed to fetch resources: {}",
                        e
                    )));
                }
            }

            drop(guard);
            drop(outlet);
        });

        session_id
    }

    /// Run a refresh to completion in the caller's task.
    ///
    /// A failure to persist the fresh report is logged and does not fail the
    /// refresh.
    pub async fn run_sync(&self) -> Result<Report> {
        debug!(collector = self.collector.name(), "Synchronous refresh");
        let report = Arc::new(self.collector.fetch_all().await?);

        persist(self.store.clone(), report.clone(), self.retention).await;
        info!(resources = report.len(), "Refresh completed");

        Ok(Arc::try_unwrap(report).unwrap_or_else(|shared| (*shared).clone()))
    }
}

/// Unregisters a session when dropped.
struct SessionGuard {
    registry: SessionRegistry,
    id: SessionId,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.destroy(&self.id);
    }
}

/// Save `report` and prune old backups. Never fails the caller.
pub(crate) async fn persist(store: Arc<dyn ReportStore>, report: Arc<Report>, retention: Duration) {
    let result = tokio::task::spawn_blocking(move || {
        let saved = store.save(&report);
        let cleanup = saved.is_ok().then(|| store.cleanup_backups(retention));
        (saved, cleanup)
    })
    .await;

    match result {
        Ok((Ok(()), cleanup)) => {
            if let Some(cleanup) = cleanup
                && cleanup.has_failures()
            {
                for failure in &cleanup.failures {
                    warn!(path = %failure.path.display(), error = %failure.error, "Backup cleanup failure");
                }
            }
        }
        Ok((Err(e), _)) => {
            warn!(error = %e, "Failed to save refreshed report");
        }
        Err(e) => {
            error!(error = %e, "Report persistence task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osreport_collector::MockCollector;
    use osreport_store::MemoryReportStore;
    use osreport_types::{ProgressKind, Resource, ResourceType};

    fn report(n: usize) -> Report {
        Report::new(
            Vec::new(),
            (0..n)
                .map(|i| Resource::new(format!("vm-{i}"), ResourceType::Server).with_project("p1", "infra"))
                .collect(),
        )
    }

    fn service(collector: MockCollector, store: Arc<MemoryReportStore>) -> RefreshService {
        RefreshService::new(Arc::new(collector), store, SessionRegistry::default())
    }

    async fn drain(service: &RefreshService, id: &SessionId) -> Vec<ProgressMessage> {
        let mut sub = service.registry.attach(id).unwrap();
        let mut events = Vec::new();
        while let Some(msg) = sub.next().await {
            events.push(msg);
        }
        events
    }

    #[tokio::test]
    async fn test_run_sync_saves_report() {
        let store = Arc::new(MemoryReportStore::new());
        let service = service(MockCollector::new(report(3)), store.clone());

        let fresh = service.run_sync().await.unwrap();
        assert_eq!(fresh.len(), 3);
        assert_eq!(store.load().unwrap(), fresh);
    }

    #[tokio::test]
    async fn test_run_sync_survives_store_failure() {
        let store = Arc::new(MemoryReportStore::new());
        store.set_fail_writes(true);
        let service = service(MockCollector::new(report(2)), store.clone());

        let fresh = service.run_sync().await.unwrap();
        assert_eq!(fresh.len(), 2);
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_run_sync_propagates_collection_error() {
        let store = Arc::new(MemoryReportStore::new());
        let service = service(MockCollector::failing("boom"), store.clone());

        let err = service.run_sync().await.unwrap_err();
        assert!(matches!(err, crate::DomainError::Collection(_)));
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_run_sync_prunes_old_backups() {
        let store = Arc::new(MemoryReportStore::new());
        store.insert_backup(report(1), Duration::from_secs(30 * 24 * 3600));
        let service = service(MockCollector::new(report(1)), store.clone());

        service.run_sync().await.unwrap();
        assert_eq!(store.backup_count(), 0);
    }

    #[tokio::test]
    async fn test_run_async_streams_to_complete() {
        let store = Arc::new(MemoryReportStore::new());
        let collector = MockCollector::new(report(4))
            .with_progress(vec![ProgressMessage::progress("Collecting servers")])
            .with_delay(Duration::from_millis(20));
        let service = service(collector, store.clone());

        let id = service.run_async();
        let events = drain(&service, &id).await;

        let kinds: Vec<_> = events.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![ProgressKind::Start, ProgressKind::Progress, ProgressKind::Complete]
        );

        let summary = events.last().unwrap().summary.clone().unwrap();
        let stored = store.load().unwrap();
        assert_eq!(summary, type_counts(&stored.resources));
        assert!(!service.registry.contains(&id));
    }

    #[tokio::test]
    async fn test_run_async_reports_error() {
        let store = Arc::new(MemoryReportStore::new());
        let collector = MockCollector::failing("keystone down").with_delay(Duration::from_millis(20));
        let service = service(collector, store.clone());

        let id = service.run_async();
        let events = drain(&service, &id).await;

        let last = events.last().unwrap();
        assert_eq!(last.kind, ProgressKind::Error);
        assert!(last.message.contains("keystone down"));
        assert_eq!(events.iter().filter(|m| m.is_terminal()).count(), 1);
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_run_async_completes_with_store_failure() {
        let store = Arc::new(MemoryReportStore::new());
        store.set_fail_writes(true);
        let collector = MockCollector::new(report(1)).with_delay(Duration::from_millis(20));
        let service = service(collector, store);

        let id = service.run_async();
        let events = drain(&service, &id).await;
        assert_eq!(events.last().unwrap().kind, ProgressKind::Complete);
    }

    #[tokio::test]
    async fn test_session_removed_without_observer() {
        let store = Arc::new(MemoryReportStore::new());
        let service = service(MockCollector::new(report(1)), store.clone());

        let id = service.run_async();
        for _ in 0..100 {
            if !service.registry.contains(&id) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!service.registry.contains(&id));
        assert!(store.exists());
    }
}
