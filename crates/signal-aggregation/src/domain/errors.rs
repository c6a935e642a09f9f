//! # Domain Errors
//!
//! Error taxonomy for the signal aggregation engine.
//!
//! Every failure is a hard failure: the triggering call aborts and the
//! ledger is left exactly as it was before the call.

use super::rate_limit::CooldownAction;
use shared_types::{format_address, Address, BatchId, RequestId, Timestamp};
use thiserror::Error;

/// Result alias used by every engine operation.
pub type SignalResult<T> = Result<T, SignalError>;

/// Coarse classification of a [`SignalError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller lacks the required role.
    Authorization,
    /// Pause flag or batch state forbids the call.
    Lifecycle,
    /// Per-address cooldown has not elapsed.
    Rate,
    /// Replay, commitment or proof checks failed.
    Integrity,
    /// Nothing to operate on.
    Data,
    /// A collaborator (runtime or oracle) failed.
    External,
}

impl ErrorCategory {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Lifecycle => "lifecycle",
            Self::Rate => "rate",
            Self::Integrity => "integrity",
            Self::Data => "data",
            Self::External => "external",
        }
    }
}

/// Signal aggregation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Caller is not the owner.
    #[error("Caller {} is not the owner", format_address(.0))]
    NotOwner(Address),

    /// Address is not an authorized provider.
    #[error("Address {} is not an authorized provider", format_address(.0))]
    NotProvider(Address),

    /// The zero address is not a valid owner or provider.
    #[error("Invalid address: zero address")]
    InvalidAddress,

    /// The engine is paused.
    #[error("Engine is paused")]
    Paused,

    /// The engine is not paused.
    #[error("Engine is not paused")]
    NotPaused,

    /// The current batch is closed.
    #[error("Batch {0} is not open")]
    BatchNotOpen(BatchId),

    /// Batch id is beyond the current batch or would move backwards.
    #[error("Invalid batch {requested} (current {current})")]
    InvalidBatch {
        /// Batch id that was asked for
        requested: BatchId,
        /// Current batch id
        current: BatchId,
    },

    /// Cooldown for this action has not elapsed.
    #[error("Cooldown active for {action}: ready at {ready_at}, now {now}")]
    CooldownActive {
        /// Rate limited action
        action: CooldownAction,
        /// Earliest timestamp at which the action is accepted
        ready_at: Timestamp,
        /// Timestamp of the rejected call
        now: Timestamp,
    },

    /// Cooldown must be positive.
    #[error("Invalid cooldown: must be greater than zero")]
    InvalidCooldown,

    /// No initialized signals exist for the batch.
    #[error("No signals to aggregate in batch {0}")]
    NoSignalsToAggregate(BatchId),

    /// The aggregate ciphertext is not initialized.
    #[error("Aggregate ciphertext is not initialized")]
    NotInitialized,

    /// No decryption context exists for the request.
    #[error("Unknown decryption request {0}")]
    UnknownRequest(RequestId),

    /// The oracle returned a request id that is already tracked.
    #[error("Duplicate decryption request {0}")]
    DuplicateRequest(RequestId),

    /// The request has already been finalized.
    #[error("Replay attempt for request {0}")]
    ReplayAttempt(RequestId),

    /// The aggregate changed since the request was made.
    #[error("State mismatch for request {0}: aggregate changed since request")]
    StateMismatch(RequestId),

    /// The oracle proof did not verify.
    #[error("Invalid decryption proof for request {0}")]
    InvalidProof(RequestId),

    /// Cleartext payload could not be decoded.
    #[error("Malformed cleartext: {0}")]
    MalformedCleartext(String),

    /// Confidential runtime failure.
    #[error("Confidential runtime error: {0}")]
    Runtime(String),

    /// Decryption oracle failure.
    #[error("Decryption oracle error: {0}")]
    Oracle(String),
}

impl SignalError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner(_) | Self::NotProvider(_) | Self::InvalidAddress => {
                ErrorCategory::Authorization
            }
            Self::Paused
            | Self::NotPaused
            | Self::BatchNotOpen(_)
            | Self::InvalidBatch { .. }
            | Self::InvalidCooldown => ErrorCategory::Lifecycle,
            Self::CooldownActive { .. } => ErrorCategory::Rate,
            Self::ReplayAttempt(_)
            | Self::StateMismatch(_)
            | Self::InvalidProof(_)
            | Self::NotInitialized
            | Self::UnknownRequest(_)
            | Self::DuplicateRequest(_)
            | Self::MalformedCleartext(_) => ErrorCategory::Integrity,
            Self::NoSignalsToAggregate(_) => ErrorCategory::Data,
            Self::Runtime(_) | Self::Oracle(_) => ErrorCategory::External,
        }
    }

    /// Short machine-readable reason, used as a metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotOwner(_) => "not_owner",
            Self::NotProvider(_) => "not_provider",
            Self::InvalidAddress => "invalid_address",
            Self::Paused => "paused",
            Self::NotPaused => "not_paused",
            Self::BatchNotOpen(_) => "batch_not_open",
            Self::InvalidBatch { .. } => "invalid_batch",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::InvalidCooldown => "invalid_cooldown",
            Self::NoSignalsToAggregate(_) => "no_signals",
            Self::NotInitialized => "not_initialized",
            Self::UnknownRequest(_) => "unknown_request",
            Self::DuplicateRequest(_) => "duplicate_request",
            Self::ReplayAttempt(_) => "replay_attempt",
            Self::StateMismatch(_) => "state_mismatch",
            Self::InvalidProof(_) => "invalid_proof",
            Self::MalformedCleartext(_) => "malformed_cleartext",
            Self::Runtime(_) => "runtime",
            Self::Oracle(_) => "oracle",
        }
    }
}
