//! Broadcast event bus for distributing canonical events to the workflow.
//!
//! Built on `tokio::sync::broadcast`. Both ingestion paths (webhook push
//! and queue pull) publish here; the workflow host subscribes. Publishing
//! with no active subscribers is a no-op.

use tokio::sync::broadcast;

use bridge_types::event::CanonicalEvent;

/// Multi-consumer bus carrying normalized workflow events.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct EventBus {
    sender: broadcast::Sender<CanonicalEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<CanonicalEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: CanonicalEvent) {
        let _ = self.sender.send(event);
    }

    /// Publish an event, reporting whether anyone received it.
    ///
    /// The poller uses this to decide between acknowledging a message
    /// (delivered) and failing it (no active subscriber).
    pub fn deliver(&self, event: CanonicalEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
