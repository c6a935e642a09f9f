//! # Domain Layer
//!
//! Ledger components, value objects, errors and invariants.

pub mod access;
pub mod batch;
pub mod context;
pub mod errors;
pub mod invariants;
pub mod rate_limit;
pub mod registry;
pub mod value_objects;

pub use access::AccessControl;
pub use batch::{BatchLifecycle, BatchState};
pub use context::DecryptionContext;
pub use errors::{ErrorCategory, SignalError, SignalResult};
pub use invariants::{
    invariant_batch_monotonic, invariant_nonzero_address, invariant_not_processed,
    invariant_state_hash_matches,
};
pub use rate_limit::{CooldownAction, CooldownTracker, DEFAULT_COOLDOWN_SECS};
pub use registry::SignalRegistry;
pub use value_objects::{AggregateRecord, CiphertextHandle, DecryptionTicket, StateHash};
