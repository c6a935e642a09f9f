//! # Protocol Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{Address, BatchId, RequestId};

/// All events emitted by the signal aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalEvent {
    // =========================================================================
    // GOVERNANCE
    // =========================================================================
    /// Ownership moved to a new address (single step, immediate).
    OwnershipTransferred {
        /// Previous owner.
        previous: Address,
        /// New owner.
        current: Address,
    },

    /// An address joined the provider allow-list.
    ProviderAdded {
        /// The authorized provider.
        provider: Address,
    },

    /// An address left the provider allow-list.
    ProviderRemoved {
        /// The de-authorized provider.
        provider: Address,
    },

    /// Mutating user actions are suspended.
    Paused {
        /// Who paused.
        by: Address,
    },

    /// Mutating user actions are resumed.
    Unpaused {
        /// Who unpaused.
        by: Address,
    },

    /// The per-address cooldown changed.
    CooldownUpdated {
        /// Old value in seconds.
        previous: u64,
        /// New value in seconds.
        current: u64,
    },

    // =========================================================================
    // BATCH LIFECYCLE
    // =========================================================================
    /// A batch started accepting submissions.
    BatchOpened {
        /// The now-current batch.
        batch_id: BatchId,
    },

    /// The current batch stopped accepting submissions.
    BatchClosed {
        /// The closed batch.
        batch_id: BatchId,
    },

    // =========================================================================
    // SUBMISSION
    // =========================================================================
    /// A provider stored (or overwrote) its signal for a batch.
    SignalSubmitted {
        /// Submitting provider.
        provider: Address,
        /// Target batch.
        batch_id: BatchId,
    },

    // =========================================================================
    // DECRYPTION
    // =========================================================================
    /// An aggregate was computed and handed to the oracle.
    DecryptionRequested {
        /// Oracle-assigned request id.
        request_id: RequestId,
        /// Batch whose aggregate is being revealed.
        batch_id: BatchId,
        /// Number of signals folded into the aggregate.
        contributors: usize,
    },

    /// A verified oracle callback revealed the aggregate.
    DecryptionCompleted {
        /// Oracle-assigned request id.
        request_id: RequestId,
        /// Batch id stored when the request was made.
        batch_id: BatchId,
        /// Revealed aggregate value.
        value: u64,
    },
}

impl SignalEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OwnershipTransferred { .. }
            | Self::ProviderAdded { .. }
            | Self::ProviderRemoved { .. }
            | Self::Paused { .. }
            | Self::Unpaused { .. }
            | Self::CooldownUpdated { .. } => EventTopic::Governance,
            Self::BatchOpened { .. } | Self::BatchClosed { .. } => EventTopic::Batch,
            Self::SignalSubmitted { .. } => EventTopic::Submission,
            Self::DecryptionRequested { .. } | Self::DecryptionCompleted { .. } => {
                EventTopic::Decryption
            }
        }
    }

    /// Batch this event refers to, if any.
    #[must_use]
    pub fn batch_id(&self) -> Option<BatchId> {
        match self {
            Self::BatchOpened { batch_id }
            | Self::BatchClosed { batch_id }
            | Self::SignalSubmitted { batch_id, .. }
            | Self::DecryptionRequested { batch_id, .. }
            | Self::DecryptionCompleted { batch_id, .. } => Some(*batch_id),
            _ => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Ownership, allow-list, pause and cooldown changes.
    Governance,
    /// Batch open/close.
    Batch,
    /// Signal submissions.
    Submission,
    /// Decryption requests and completions.
    Decryption,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only events about this batch. `None` means any batch.
    pub batch_id: Option<BatchId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            batch_id: None,
        }
    }

    /// Restrict the filter to events about one batch.
    #[must_use]
    pub fn for_batch(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SignalEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let batch_match = match self.batch_id {
            None => true,
            Some(wanted) => event.batch_id() == Some(wanted),
        };

        topic_match && batch_match
    }
}
