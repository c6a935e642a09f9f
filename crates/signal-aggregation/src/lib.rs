//! # Signal Aggregation
//!
//! Confidential signal aggregation engine.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Authorized providers submit encrypted signals into numbered batches. On
//! demand the engine homomorphically sums a batch's signals and asks an
//! external oracle to decrypt only that aggregate. The oracle answers later
//! through an independent callback, which is verified before the result is
//! accepted.
//!
//! ## Callback Verification
//!
//! | Step | Rejects with | Guards against |
//! |------|--------------|----------------|
//! | Replay guard | `ReplayAttempt` | Finalizing a request twice |
//! | State integrity | `StateMismatch` | Aggregate recomputed after the request |
//! | Proof | `InvalidProof` | Forged or misattributed cleartexts |
//! | Decode | `MalformedCleartext` | Payloads that are not one 64-bit word |
//!
//! ## Module Structure
//!
//! ```text
//! signal-aggregation/
//! ├── domain/          # Access control, cooldowns, batches, registry, contexts
//! ├── algorithms/      # Aggregation fold, commitment, callback verification
//! ├── ports/           # SignalAggregationApi, ConfidentialRuntime, DecryptionOracle
//! ├── adapters/        # In-memory runtime, channel-backed oracle
//! ├── application/     # Ledger state and service
//! └── ipc/             # JSON transactions
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod metrics;
pub mod ports;

// Re-exports
pub use adapters::{ChannelDecryptionOracle, DecryptionJob, InMemoryConfidentialRuntime, ProofKey};
pub use algorithms::{
    accumulate, aggregate_signals, commit_aggregate, compute_state_hash, decode_cleartext,
    encode_cleartext, verify_callback, Aggregation,
};
pub use application::{LedgerState, SignalAggregationService};
pub use config::{AggregationConfig, DEFAULT_CONTRACT_IDENTITY};
pub use domain::{
    AccessControl, AggregateRecord, BatchLifecycle, BatchState, CiphertextHandle, CooldownAction,
    CooldownTracker, DecryptionContext, DecryptionTicket, ErrorCategory, SignalError,
    SignalRegistry, SignalResult, StateHash, DEFAULT_COOLDOWN_SECS,
};
pub use ipc::{CallOutcome, CallReceipt, SignalCall, SignalTransaction, TransactionHandler};
pub use ports::{
    ConfidentialRuntime, DecryptionOracle, MockDecryptionOracle, SignalAggregationApi,
    MOCK_VALID_PROOF,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
