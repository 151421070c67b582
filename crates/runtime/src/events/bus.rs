//! Topic-based event bus implementation.

use tokio::sync::broadcast;

use super::types::{Event, Topic};

/// Routes events to per-topic broadcast channels so consumers only receive
/// what they subscribed to. Publishing is best-effort: a topic with no
/// subscribers simply drops the event.
#[derive(Clone)]
pub struct EventBus {
    round: broadcast::Sender<Event>,
    match_flow: broadcast::Sender<Event>,
    effect: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic.
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Creates a new event bus with the specified capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            round: broadcast::channel(capacity).0,
            match_flow: broadcast::channel(capacity).0,
            effect: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Round => &self.round,
            Topic::Match => &self.match_flow,
            Topic::Effect => &self.effect,
        }
    }

    /// Publish an event to its corresponding topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - normal, not an error.
            tracing::trace!(?topic, "no subscribers for topic");
        }
    }

    /// Subscribe to a specific topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
