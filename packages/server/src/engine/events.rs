use common::event::{Event, GenericEvent};
use tokio::sync::broadcast;
use tracing::debug;

/// In-process fan-out for engine events.
///
/// Publishing is advisory: delivery to relays (websockets, feeds) is a
/// collaborator concern, and a publish with no listeners is not an
/// error. The scoring path never blocks or fails on the bus.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GenericEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GenericEvent> {
        self.tx.subscribe()
    }

    pub fn publish<E: Event>(&self, event: &E) {
        let generic = event.to_generic_event();
        match self.tx.send(generic) {
            Ok(receivers) => debug!(topic = event.topic(), receivers, "event published"),
            Err(_) => debug!(topic = event.topic(), "event dropped, no subscribers"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use common::event::{ScoreboardUpdateEvent, TOPIC_SCOREBOARD_UPDATE};

    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(&ScoreboardUpdateEvent { challenge_id: 3 });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.topic, TOPIC_SCOREBOARD_UPDATE);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new(8);
        bus.publish(&ScoreboardUpdateEvent { challenge_id: 3 });
    }
}
