//! # Signal Registry
//!
//! One ciphertext handle per `(provider, batch)`. Resubmission overwrites.

use super::value_objects::CiphertextHandle;
use shared_types::{Address, BatchId};
use std::collections::HashMap;

/// Stored signals keyed by provider and batch.
#[derive(Clone, Debug, Default)]
pub struct SignalRegistry {
    signals: HashMap<(Address, BatchId), CiphertextHandle>,
}

impl SignalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` for `(provider, batch_id)`. Returns the overwritten handle.
    pub fn store(
        &mut self,
        provider: Address,
        batch_id: BatchId,
        handle: CiphertextHandle,
    ) -> Option<CiphertextHandle> {
        self.signals.insert((provider, batch_id), handle)
    }

    /// Signal stored by `provider` in `batch_id`.
    pub fn get(&self, provider: &Address, batch_id: BatchId) -> Option<CiphertextHandle> {
        self.signals.get(&(*provider, batch_id)).copied()
    }

    /// Signals for `batch_id` from each of `providers`, in iteration order.
    /// Providers without a signal in the batch are skipped.
    pub fn contributions<'a>(
        &self,
        batch_id: BatchId,
        providers: impl Iterator<Item = &'a Address>,
    ) -> Vec<(Address, CiphertextHandle)> {
        providers
            .filter_map(|provider| {
                self.get(provider, batch_id)
                    .map(|handle| (*provider, handle))
            })
            .collect()
    }

    /// Total stored signals across all batches.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
