//! # Value Objects
//!
//! Opaque ciphertext handles, commitments and request receipts.

use serde::{Deserialize, Serialize};
use shared_types::{BatchId, Hash, RequestId};
use std::fmt;

/// Opaque reference to an encrypted value held by the confidential runtime.
///
/// The engine never interprets the bytes; handles are only stored, compared
/// and passed back to the runtime for homomorphic combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CiphertextHandle(pub Hash);

impl CiphertextHandle {
    /// Wrap raw handle bytes.
    pub fn new(bytes: Hash) -> Self {
        Self(bytes)
    }

    /// Raw handle bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Parse a `0x`-prefixed or bare 64-character hex string.
    pub fn from_hex(input: &str) -> Result<Self, String> {
        let stripped = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(stripped).map_err(|e| e.to_string())?;
        let bytes: Hash = bytes
            .try_into()
            .map_err(|v: Vec<u8>| format!("expected 32 bytes, got {}", v.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Commitment binding a decryption request to ciphertext identity and
/// engine instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateHash(pub Hash);

impl StateHash {
    /// Raw commitment bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Aggregate stored for a batch.
///
/// `generation` counts the aggregations of one batch, starting at 1. Two
/// aggregations of the same batch never share a generation, even when the
/// runtime hands back the same handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Aggregate ciphertext
    pub handle: CiphertextHandle,
    /// Aggregation count for the batch
    pub generation: u64,
}

impl AggregateRecord {
    /// Record for the aggregation following `previous`.
    pub fn next(handle: CiphertextHandle, previous: Option<&AggregateRecord>) -> Self {
        Self {
            handle,
            generation: previous.map_or(1, |record| record.generation.saturating_add(1)),
        }
    }
}

/// Receipt returned by a successful aggregate-and-request call.
///
/// The cleartext is not part of the receipt; it arrives later through the
/// oracle callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionTicket {
    /// Oracle-assigned request id
    pub request_id: RequestId,
    /// Batch the aggregate belongs to
    pub batch_id: BatchId,
    /// Commitment recorded for the request
    pub state_hash: StateHash,
    /// Number of signals folded into the aggregate
    pub contributors: usize,
}
