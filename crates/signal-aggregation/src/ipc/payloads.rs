//! IPC payloads
//!
//! JSON-encoded transactions accepted by the engine and the receipts it
//! returns. Addresses, handles and byte strings are `0x`-prefixed hex.

use crate::domain::{DecryptionTicket, SignalError};
use serde::{Deserialize, Serialize};
use shared_types::{BatchId, Timestamp};
use uuid::Uuid;

/// A call plus the envelope identity it runs under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTransaction {
    /// Caller address (ignored for oracle callbacks)
    pub sender: String,
    /// Call timestamp (seconds)
    pub timestamp: Timestamp,
    /// The call itself
    pub call: SignalCall,
}

/// Engine calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SignalCall {
    /// Hand ownership to a new address.
    TransferOwnership {
        /// New owner
        new_owner: String,
    },
    /// Authorize a provider.
    AddProvider {
        /// Provider address
        provider: String,
    },
    /// Revoke a provider.
    RemoveProvider {
        /// Provider address
        provider: String,
    },
    /// Pause.
    Pause,
    /// Unpause.
    Unpause,
    /// Change the cooldown.
    SetCooldown {
        /// New cooldown (seconds)
        cooldown_secs: u64,
    },
    /// Open a batch.
    OpenBatch,
    /// Close the current batch.
    CloseBatch,
    /// Submit a ciphertext handle.
    SubmitSignal {
        /// Ciphertext handle
        ciphertext: String,
    },
    /// Aggregate the current batch and request decryption.
    AggregateAndRequestDecryption,
    /// Deliver an oracle result.
    DecryptionCallback {
        /// Oracle request id
        request_id: u64,
        /// Encoded cleartexts
        cleartexts: String,
        /// Oracle proof
        proof: String,
    },
}

impl SignalCall {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransferOwnership { .. } => "transfer_ownership",
            Self::AddProvider { .. } => "add_provider",
            Self::RemoveProvider { .. } => "remove_provider",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::SetCooldown { .. } => "set_cooldown",
            Self::OpenBatch => "open_batch",
            Self::CloseBatch => "close_batch",
            Self::SubmitSignal { .. } => "submit_signal",
            Self::AggregateAndRequestDecryption => "aggregate_and_request_decryption",
            Self::DecryptionCallback { .. } => "decryption_callback",
        }
    }
}

/// What an applied call produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Call applied, nothing to report.
    Applied,
    /// Call applied to a batch.
    Batch {
        /// Affected batch
        batch_id: BatchId,
    },
    /// Decryption requested.
    Requested(DecryptionTicket),
    /// Decryption finalized.
    Revealed {
        /// Revealed aggregate
        value: u64,
    },
    /// Call rejected by the engine; nothing changed.
    Rejected {
        /// Error category
        category: String,
        /// Machine-readable reason
        reason: String,
        /// Human-readable message
        message: String,
    },
    /// Transaction could not be decoded.
    Malformed {
        /// Decoder message
        message: String,
    },
}

impl From<SignalError> for CallOutcome {
    fn from(err: SignalError) -> Self {
        Self::Rejected {
            category: err.category().as_str().to_string(),
            reason: err.reason().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome tagged with a correlation id for log matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallReceipt {
    /// Correlation id, also attached to the handler's log lines
    pub correlation_id: Uuid,
    /// Outcome
    #[serde(flatten)]
    pub outcome: CallOutcome,
}
