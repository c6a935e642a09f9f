//! # Shared Bus - Protocol Event Bus
//!
//! Every state transition of the signal aggregation engine is announced as a
//! [`SignalEvent`] on this bus. Observers (dashboards, indexers, the node's
//! own log relay) subscribe with an [`EventFilter`].
//!
//! ```text
//! ┌──────────────┐    publish()     ┌──────────────┐   subscribe()   ┌──────────┐
//! │ Aggregation  │ ───────────────→ │  Event Bus   │ ──────────────→ │ Observer │
//! │   Engine     │                  │ (broadcast)  │                 │          │
//! └──────────────┘                  └──────────────┘                 └──────────┘
//! ```
//!
//! Events never carry ciphertext contents; the only cleartext on the bus is
//! the revealed per-batch aggregate in `DecryptionCompleted`.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, SignalEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
