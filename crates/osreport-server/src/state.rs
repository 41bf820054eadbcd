//! Application state shared across handlers.

use std::sync::Arc;

use osreport_domain::DomainServices;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Refresh, report and session services.
    pub services: DomainServices,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(services: DomainServices, config: ServerConfig) -> Self {
        Self {
            services,
            config: Arc::new(config),
        }
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the domain services.
    pub fn services(&self) -> &DomainServices {
        &self.services
    }

    /// Number of refreshes currently in flight.
    pub fn active_sessions(&self) -> usize {
        self.services.registry().len()
    }
}

/// State backed by a collector returning an empty report and an empty store.
#[cfg(test)]
pub(crate) fn test_state(config: ServerConfig) -> AppState {
    use osreport_collector::MockCollector;
    use osreport_store::MemoryReportStore;
    use osreport_types::Report;

    test_state_with(
        Arc::new(MockCollector::new(Report::new(Vec::new(), Vec::new()))),
        Arc::new(MemoryReportStore::new()),
        config,
    )
}

/// State backed by the given mock collector and in-memory store.
#[cfg(test)]
pub(crate) fn test_state_with(
    collector: Arc<osreport_collector::MockCollector>,
    store: Arc<osreport_store::MemoryReportStore>,
    config: ServerConfig,
) -> AppState {
    use osreport_session::SessionRegistry;
    use osreport_store::DEFAULT_BACKUP_RETENTION;

    let services = DomainServices::new(
        collector,
        store,
        SessionRegistry::default(),
        DEFAULT_BACKUP_RETENTION,
    );
    AppState::new(services, config)
}
