//! # Decryption Context
//!
//! Pending record created for each oracle decryption request.

use super::value_objects::StateHash;
use serde::{Deserialize, Serialize};
use shared_types::{BatchId, RequestId, Timestamp};

/// Record of one decryption request.
///
/// `processed` moves from `false` to `true` exactly once, through a fully
/// verified callback, and never back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionContext {
    /// Oracle-assigned request id
    pub request_id: RequestId,
    /// Batch whose aggregate was submitted for decryption
    pub batch_id: BatchId,
    /// Commitment over the aggregate at request time
    pub state_hash: StateHash,
    /// Number of signals in the aggregate
    pub contributors: usize,
    /// Timestamp of the request
    pub requested_at: Timestamp,
    /// Terminal flag
    pub processed: bool,
    /// Revealed aggregate, set on finalization
    pub revealed: Option<u64>,
}

impl DecryptionContext {
    /// New pending context.
    pub fn new(
        request_id: RequestId,
        batch_id: BatchId,
        state_hash: StateHash,
        contributors: usize,
        requested_at: Timestamp,
    ) -> Self {
        Self {
            request_id,
            batch_id,
            state_hash,
            contributors,
            requested_at,
            processed: false,
            revealed: None,
        }
    }

    /// Whether no verified callback has arrived yet.
    pub fn is_pending(&self) -> bool {
        !self.processed
    }

    /// Mark finalized with the revealed value.
    pub(crate) fn finalize(&mut self, value: u64) {
        self.processed = true;
        self.revealed = Some(value);
    }
}
