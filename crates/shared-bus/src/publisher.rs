//! # Event Publisher
//!
//! The engine publishes through [`EventPublisher`]; the node and the tests
//! hand it an [`InMemoryEventBus`], a `tokio::sync::broadcast` channel with
//! the filtering done on the receiving side.

use crate::events::{EventFilter, SignalEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Sink for engine events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`. Returns how many receivers were live to get it.
    async fn publish(&self, event: SignalEvent) -> usize;

    /// Events published since creation, received or not.
    fn events_published(&self) -> u64;
}

/// Broadcast-backed bus.
///
/// Every live receiver gets every event in publication order, up to
/// `capacity` buffered events per receiver.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SignalEvent>,
    published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering at most `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Events published after this call that match `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, batch = ?filter.batch_id, "Observer subscribed");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Same as [`subscribe`](Self::subscribe), as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }

    /// Live receivers, subscriptions and streams alike.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: SignalEvent) -> usize {
        let topic = event.topic();
        let sequence = self.published.fetch_add(1, Ordering::Relaxed);

        // A send error only means nobody is listening
        let receivers = self.sender.send(event).unwrap_or(0);
        if receivers == 0 {
            trace!(?topic, sequence, "Event published without observers");
        } else {
            debug!(?topic, sequence, receivers, "Event published");
        }
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
