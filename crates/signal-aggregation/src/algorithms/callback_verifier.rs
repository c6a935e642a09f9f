//! # Callback Verifier
//!
//! Checks an oracle callback before its result is accepted:
//!
//! 1. Replay guard: the context must not be processed.
//! 2. State integrity: the commitment over the batch's *current* aggregate
//!    must equal the one recorded at request time.
//! 3. Proof: the oracle proof must bind `cleartexts` to the request.
//! 4. Decode: `cleartexts` must be one 32-byte big-endian word fitting `u64`.
//!
//! Steps run in this order and each one is a hard failure.

use super::commitment::commit_aggregate;
use crate::domain::{
    invariant_not_processed, invariant_state_hash_matches, AggregateRecord, DecryptionContext,
    SignalError, SignalResult,
};
use crate::ports::DecryptionOracle;
use primitive_types::U256;
use shared_types::Address;

/// Size of one ABI word in a cleartext payload.
pub const CLEARTEXT_WORD_LEN: usize = 32;

/// Run the full verification pipeline. Returns the decoded value.
///
/// Does not mutate `context`; the caller finalizes it on success.
pub fn verify_callback<O>(
    context: &DecryptionContext,
    current_aggregate: Option<&AggregateRecord>,
    contract_identity: &Address,
    oracle: &O,
    cleartexts: &[u8],
    proof: &[u8],
) -> SignalResult<u64>
where
    O: DecryptionOracle + ?Sized,
{
    invariant_not_processed(context)?;

    let current_hash = current_aggregate.map(|record| commit_aggregate(record, contract_identity));
    invariant_state_hash_matches(context, current_hash.as_ref())?;

    if !oracle.verify_proof(context.request_id, cleartexts, proof) {
        return Err(SignalError::InvalidProof(context.request_id));
    }

    decode_cleartext(cleartexts)
}

/// Whether a pending `context` would fail the state-integrity check now.
pub fn is_stale(
    context: &DecryptionContext,
    current_aggregate: Option<&AggregateRecord>,
    contract_identity: &Address,
) -> bool {
    if context.processed {
        return false;
    }
    let current_hash = current_aggregate.map(|record| commit_aggregate(record, contract_identity));
    invariant_state_hash_matches(context, current_hash.as_ref()).is_err()
}

/// Encode a value as one 32-byte big-endian word.
pub fn encode_cleartext(value: u64) -> Vec<u8> {
    let mut word = [0u8; CLEARTEXT_WORD_LEN];
    U256::from(value).to_big_endian(&mut word);
    word.to_vec()
}

/// Decode one 32-byte big-endian word into a `u64`.
pub fn decode_cleartext(cleartexts: &[u8]) -> SignalResult<u64> {
    if cleartexts.len() != CLEARTEXT_WORD_LEN {
        return Err(SignalError::MalformedCleartext(format!(
            "expected {} bytes, got {}",
            CLEARTEXT_WORD_LEN,
            cleartexts.len()
        )));
    }

    let value = U256::from_big_endian(cleartexts);
    if value > U256::from(u64::MAX) {
        return Err(SignalError::MalformedCleartext(
            "value does not fit in 64 bits".to_string(),
        ));
    }
    Ok(value.low_u64())
}
