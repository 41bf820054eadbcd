//! The session registry.

use std::collections::HashMap;
use std::sync::Arc;

use osreport_types::{ProgressMessage, SessionId};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::sync::mpsc::Receiver;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::outlet::{self, ProgressOutlet, ProgressSubscription};

type SharedReceiver = Arc<Mutex<Receiver<ProgressMessage>>>;

/// Concurrent map from session id to the consuming half of its outlet.
///
/// Cheap to clone; clones share the same map.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SharedReceiver>>>,
    config: RegistryConfig,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Get the registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new session with a fresh outlet.
    pub fn create(&self) -> (SessionId, ProgressOutlet) {
        let capacity = self.config.effective_capacity();
        let mut sessions = self.sessions.write();

        let mut id = SessionId::generate();
        while sessions.contains_key(&id) {
            id = SessionId::generate();
        }

        let (outlet, rx) = outlet::channel(id.clone(), capacity);
        sessions.insert(id.clone(), rx);
        debug!(session_id = %id, capacity, active = sessions.len(), "Session created");

        (id, outlet)
    }

    /// Subscribe to a registered session's outlet.
    pub fn attach(&self, id: &SessionId) -> Result<ProgressSubscription> {
        let sessions = self.sessions.read();
        let rx = sessions
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        debug!(session_id = %id, "Observer attached");
        Ok(ProgressSubscription::new(id.clone(), rx))
    }

    /// Unregister a session.
    ///
    /// Returns `false` if it was not registered. Existing subscriptions keep
    /// working until the outlet closes.
    pub fn destroy(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().remove(id).is_some();
        if removed {
            debug!(session_id = %id, "Session destroyed");
        }
        removed
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Snapshot of registered session ids.
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlet::PushOutcome;
    use osreport_types::TypeCounts;

    #[test]
    fn test_create_registers_session() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();

        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);
        assert_eq!(outlet.session_id(), &id);
        assert_eq!(outlet.capacity(), 100);
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = SessionRegistry::default();
        let (a, _oa) = registry.create();
        let (b, _ob) = registry.create();
        assert_ne!(a, b);

        let mut ids = registry.ids();
        ids.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        let mut expected = vec![a, b];
        expected.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_attach_unknown_session() {
        let registry = SessionRegistry::default();
        let err = registry.attach(&SessionId::from("session_missing")).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref id) if id == "session_missing"));
    }

    #[test]
    fn test_double_destroy_is_harmless() {
        let registry = SessionRegistry::default();
        let (id, _outlet) = registry.create();

        assert!(registry.destroy(&id));
        assert!(!registry.destroy(&id));
        assert!(registry.is_empty());
        assert!(registry.attach(&id).is_err());
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let registry = SessionRegistry::new(RegistryConfig::new().with_outlet_capacity(0));
        let (_id, outlet) = registry.create();
        assert_eq!(outlet.capacity(), 1);
        assert_eq!(outlet.try_push(ProgressMessage::start("s")), PushOutcome::Sent);
        assert_eq!(outlet.try_push(ProgressMessage::progress("p")), PushOutcome::Dropped);
    }

    #[tokio::test]
    async fn test_subscriber_drains_after_destroy() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();
        let mut sub = registry.attach(&id).unwrap();

        outlet.try_push(ProgressMessage::start("Starting"));
        outlet.try_push(ProgressMessage::complete("Done", TypeCounts::new()));
        registry.destroy(&id);
        drop(outlet);

        assert_eq!(sub.next().await.unwrap().message, "Starting");
        assert!(sub.next().await.unwrap().is_terminal());
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_late_attach_sees_buffered_events() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();
        outlet.try_push(ProgressMessage::start("early"));

        let mut sub = registry.attach(&id).unwrap();
        assert_eq!(sub.next().await.unwrap().message, "early");
    }

    #[tokio::test]
    async fn test_sessions_do_not_cross_talk() {
        let registry = SessionRegistry::default();
        let (a, outlet_a) = registry.create();
        let (b, outlet_b) = registry.create();

        outlet_a.try_push(ProgressMessage::progress("from a"));
        outlet_b.try_push(ProgressMessage::progress("from b"));
        drop(outlet_a);
        drop(outlet_b);

        let mut sub_a = registry.attach(&a).unwrap();
        let mut sub_b = registry.attach(&b).unwrap();
        assert_eq!(sub_a.next().await.unwrap().message, "from a");
        assert!(sub_a.next().await.is_none());
        assert_eq!(sub_b.next().await.unwrap().message, "from b");
        assert!(sub_b.next().await.is_none());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_share_events() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();
        let mut first = registry.attach(&id).unwrap();
        let mut second = registry.attach(&id).unwrap();

        outlet.try_push(ProgressMessage::progress("one"));
        outlet.try_push(ProgressMessage::progress("two"));
        drop(outlet);

        // Each event is delivered once, to whichever subscriber polls
        assert_eq!(first.next().await.unwrap().message, "one");
        assert_eq!(second.next().await.unwrap().message, "two");
        assert!(first.next().await.is_none());
        assert!(second.next().await.is_none());
    }
}
