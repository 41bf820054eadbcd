//! Progress streams for observers.

use futures_core::Stream;
use osreport_session::ProgressSubscription;
use osreport_types::ProgressMessage;
use tracing::debug;

/// Turn a subscription into a stream of progress events.
///
/// The stream ends after the first terminal event or when the outlet closes.
/// Dropping it only abandons the subscription; the refresh keeps running.
pub fn progress_stream(
    mut subscription: ProgressSubscription,
) -> impl Stream<Item = ProgressMessage> + Send + 'static {
    async_stream::stream! {
        while let Some(message) = subscription.next().await {
            let terminal = message.is_terminal();
            yield message;
            if terminal {
                debug!(session_id = %subscription.session_id(), "Progress stream finished");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use osreport_session::SessionRegistry;
    use osreport_types::{ProgressKind, TypeCounts};

    #[tokio::test]
    async fn test_stream_stops_after_terminal() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();
        let sub = registry.attach(&id).unwrap();

        outlet.try_push(ProgressMessage::start("s"));
        outlet.try_push(ProgressMessage::complete("done", TypeCounts::new()));
        // Anything after a terminal event is never observed
        outlet.try_push(ProgressMessage::progress("late"));

        let events: Vec<_> = progress_stream(sub).collect().await;
        let kinds: Vec<_> = events.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![ProgressKind::Start, ProgressKind::Complete]);
    }

    #[tokio::test]
    async fn test_stream_ends_when_outlet_closes() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();
        let sub = registry.attach(&id).unwrap();

        outlet.try_push(ProgressMessage::progress("p"));
        drop(outlet);

        let events: Vec<_> = progress_stream(sub).collect().await;
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_dropping_stream_leaves_session_alone() {
        let registry = SessionRegistry::default();
        let (id, outlet) = registry.create();
        let stream = progress_stream(registry.attach(&id).unwrap());
        drop(stream);

        assert!(registry.contains(&id));
        assert_eq!(
            outlet.try_push(ProgressMessage::progress("still running")),
            osreport_session::PushOutcome::Sent
        );
    }
}
