//! # Aggregator
//!
//! Homomorphic, unweighted sum of a batch's signals.

use crate::domain::{CiphertextHandle, SignalError, SignalResult};
use crate::ports::ConfidentialRuntime;
use shared_types::{Address, BatchId};

/// Result of folding a batch's signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aggregation {
    /// Aggregate ciphertext
    pub handle: CiphertextHandle,
    /// Number of signals folded in
    pub contributors: usize,
}

/// Fold `handle` into the accumulator slot.
///
/// An empty slot is seeded with `handle`; otherwise the slot is replaced by
/// `runtime.add(slot, handle)`. The result is written through `slot`. On
/// error the slot keeps its previous value.
pub fn accumulate<R>(
    slot: &mut Option<CiphertextHandle>,
    handle: CiphertextHandle,
    runtime: &R,
) -> SignalResult<()>
where
    R: ConfidentialRuntime + ?Sized,
{
    let next = match slot {
        None => handle,
        Some(acc) => runtime.add(acc, &handle)?,
    };
    *slot = Some(next);
    Ok(())
}

/// Sum every initialized signal in `contributions`.
///
/// Uninitialized handles are skipped. Fails with `NoSignalsToAggregate`
/// when nothing is left to sum.
pub fn aggregate_signals<R>(
    runtime: &R,
    batch_id: BatchId,
    contributions: &[(Address, CiphertextHandle)],
) -> SignalResult<Aggregation>
where
    R: ConfidentialRuntime + ?Sized,
{
    let mut slot = None;
    let mut contributors = 0usize;

    for (_, handle) in contributions {
        if !runtime.is_initialized(handle) {
            continue;
        }
        accumulate(&mut slot, *handle, runtime)?;
        contributors += 1;
    }

    match slot {
        Some(handle) => Ok(Aggregation {
            handle,
            contributors,
        }),
        None => Err(SignalError::NoSignalsToAggregate(batch_id)),
    }
}
