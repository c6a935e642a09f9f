//! # Domain Invariants
//!
//! Business rules enforced across the engine.

use super::context::DecryptionContext;
use super::errors::{SignalError, SignalResult};
use super::value_objects::StateHash;
use shared_types::{Address, BatchId, ZERO_ADDRESS};

/// Invariant: batch id never decreases.
pub fn invariant_batch_monotonic(current: BatchId, next: BatchId) -> SignalResult<()> {
    if next < current {
        return Err(SignalError::InvalidBatch {
            requested: next,
            current,
        });
    }
    Ok(())
}

/// Invariant: owners and providers are never the zero address.
pub fn invariant_nonzero_address(address: &Address) -> SignalResult<()> {
    if *address == ZERO_ADDRESS {
        return Err(SignalError::InvalidAddress);
    }
    Ok(())
}

/// Invariant: a finalized context is never finalized again.
pub fn invariant_not_processed(context: &DecryptionContext) -> SignalResult<()> {
    if context.processed {
        return Err(SignalError::ReplayAttempt(context.request_id));
    }
    Ok(())
}

/// Invariant: the commitment recorded at request time matches the
/// commitment over the current aggregate.
///
/// `current` is `None` when the batch has no aggregate at all.
pub fn invariant_state_hash_matches(
    context: &DecryptionContext,
    current: Option<&StateHash>,
) -> SignalResult<()> {
    match current {
        Some(hash) if *hash == context.state_hash => Ok(()),
        _ => Err(SignalError::StateMismatch(context.request_id)),
    }
}
