//! # State Commitment
//!
//! `state_hash = keccak256(len_be64 || handle_0 || ... || handle_n || generation_be64 || contract_identity)`
//!
//! Binds a decryption request to the exact ciphertext handles, to the
//! aggregation that produced them and to the engine instance that issued it.
//! Re-aggregating a batch always moves the commitment, even when the runtime
//! returns an identical handle.

use crate::domain::{AggregateRecord, CiphertextHandle, StateHash};
use sha3::{Digest, Keccak256};
use shared_types::Address;

/// Compute the commitment over `handles` at `generation` for the engine
/// `contract_identity`.
pub fn compute_state_hash(
    handles: &[CiphertextHandle],
    generation: u64,
    contract_identity: &Address,
) -> StateHash {
    let mut hasher = Keccak256::new();
    hasher.update((handles.len() as u64).to_be_bytes());
    for handle in handles {
        hasher.update(handle.as_bytes());
    }
    hasher.update(generation.to_be_bytes());
    hasher.update(contract_identity);
    StateHash(hasher.finalize().into())
}

/// Commitment over a stored batch aggregate.
pub fn commit_aggregate(record: &AggregateRecord, contract_identity: &Address) -> StateHash {
    compute_state_hash(&[record.handle], record.generation, contract_identity)
}
