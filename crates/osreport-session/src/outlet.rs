//! Bounded progress outlets and their subscriptions.

use std::sync::Arc;

use osreport_types::{ProgressMessage, SessionId};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tracing::{debug, trace};

/// Result of a non-blocking push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The event was buffered.
    Sent,
    /// The outlet was full and the event was discarded.
    Dropped,
    /// Every subscription handle is gone; nobody can receive the event.
    Closed,
}

/// Producing half of a session's progress outlet.
///
/// Owned by the refresh task. Dropping it closes the outlet: subscribers
/// drain whatever is still buffered and then observe the end of the stream.
#[derive(Debug)]
pub struct ProgressOutlet {
    session_id: SessionId,
    tx: Sender<ProgressMessage>,
    capacity: usize,
}

impl ProgressOutlet {
    pub(crate) fn new(session_id: SessionId, tx: Sender<ProgressMessage>, capacity: usize) -> Self {
        Self {
            session_id,
            tx,
            capacity,
        }
    }

    /// The session this outlet belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Maximum number of buffered events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push an event without waiting.
    ///
    /// A full outlet drops the event; progress delivery is best-effort.
    pub fn try_push(&self, message: ProgressMessage) -> PushOutcome {
        match self.tx.try_send(message) {
            Ok(()) => {
                trace!(session_id = %self.session_id, "Progress event queued");
                PushOutcome::Sent
            }
            Err(TrySendError::Full(message)) => {
                debug!(
                    session_id = %self.session_id,
                    kind = ?message.kind,
                    "Progress outlet full, dropping event"
                );
                PushOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => PushOutcome::Closed,
        }
    }
}

/// Consuming handle on a session's outlet.
///
/// Subscriptions to the same session share one receiver, so each event goes
/// to whichever subscription polls first.
#[derive(Debug, Clone)]
pub struct ProgressSubscription {
    session_id: SessionId,
    rx: Arc<Mutex<Receiver<ProgressMessage>>>,
}

impl ProgressSubscription {
    pub(crate) fn new(session_id: SessionId, rx: Arc<Mutex<Receiver<ProgressMessage>>>) -> Self {
        Self { session_id, rx }
    }

    /// The session this subscription observes.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the outlet is closed and drained.
    pub async fn next(&mut self) -> Option<ProgressMessage> {
        self.rx.lock().await.recv().await
    }
}

/// Allocate a bounded outlet for `session_id`.
pub(crate) fn channel(
    session_id: SessionId,
    capacity: usize,
) -> (ProgressOutlet, Arc<Mutex<Receiver<ProgressMessage>>>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        ProgressOutlet::new(session_id, tx, capacity),
        Arc::new(Mutex::new(rx)),
    )
}
