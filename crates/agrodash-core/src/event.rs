//! Event bus for agrodash using tokio::broadcast
//!
//! The store publishes one event per mutation so downstream consumers
//! (report refreshers, audit loggers) can react without polling.

use tokio::sync::broadcast;

use crate::models::EntityKind;

/// Events emitted by the data layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// A record was inserted
    RecordCreated { kind: EntityKind, id: String },
    /// A record received a partial update
    RecordUpdated { kind: EntityKind, id: String },
    /// A record was deleted
    RecordDeleted { kind: EntityKind, id: String },
    /// A snapshot finished loading
    SnapshotLoaded { records: usize },
}

/// Event bus for broadcasting data events
///
/// Uses tokio::broadcast for multi-consumer support.
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DataEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }

    /// Get current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::default_capacity();
        let mut rx = bus.subscribe();

        bus.publish(DataEvent::SnapshotLoaded { records: 3 });
        bus.publish(DataEvent::RecordCreated {
            kind: EntityKind::Crop,
            id: "crop-1".to_string(),
        });

        let event1 = rx.recv().await.unwrap();
        assert_eq!(event1, DataEvent::SnapshotLoaded { records: 3 });

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            DataEvent::RecordCreated { kind: EntityKind::Crop, id } if id == "crop-1"
        ));
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::default_capacity();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(DataEvent::RecordDeleted {
            kind: EntityKind::Farm,
            id: "farm-1".to_string(),
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();

        assert!(matches!(e1, DataEvent::RecordDeleted { kind: EntityKind::Farm, .. }));
        assert_eq!(e1, e2);
    }

    #[test]
    fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::default_capacity();
        bus.publish(DataEvent::SnapshotLoaded { records: 0 });
    }
}
