use dnsguard_config::constants::EVENT_BUS_CAPACITY;
use tokio::sync::broadcast;
use tracing::warn;

use crate::event::Event;

/// In-process publish/subscribe for domain events. Delivery is best-effort:
/// a subscriber that falls behind has its oldest unread events dropped
/// (tokio's broadcast channel semantics) rather than blocking publishers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event. Returns the number of subscribers it reached;
    /// publishing with zero subscribers is not an error.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A single subscriber's view of the bus. Wraps `broadcast::Receiver` and
/// turns a `Lagged` gap into a logged warning instead of a caller-visible
/// error, so consumers only ever see real events or a closed bus.
pub struct EventSubscriber {
    rx: broadcast::Receiver<Event>,
}

impl EventSubscriber {
    /// Awaits the next event, transparently skipping past any gap caused by
    /// a slow consumer (drop-oldest, logged once per gap).
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged, oldest events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ReconcileStats;

    #[tokio::test]
    async fn publish_is_received_by_subscriber() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        bus.publish(Event::ReconcileStarted);
        bus.publish(Event::ReconcileFinished(ReconcileStats {
            created: 1,
            ..Default::default()
        }));

        assert_eq!(sub.recv().await, Some(Event::ReconcileStarted));
        assert_eq!(
            sub.recv().await,
            Some(Event::ReconcileFinished(ReconcileStats {
                created: 1,
                ..Default::default()
            }))
        );
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(Event::ReconcileStarted);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_past_dropped_events_instead_of_erroring() {
        let bus = EventBus::with_capacity(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.publish(Event::ReconcileStarted);
        }

        // The channel only holds 2; recv() should still return an event
        // rather than surfacing the lag as an error to the caller.
        let event = sub.recv().await;
        assert_eq!(event, Some(Event::ReconcileStarted));
    }
}
