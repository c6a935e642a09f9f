//! # Shared Types Crate
//!
//! Identity and envelope types used across the Cipher-Signal workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Address`, `BatchId` and `RequestId` are
//!   defined once and re-used by the engine, the event bus and the runtime.
//! - **Envelope Identity**: every state-changing call carries a
//!   [`CallContext`]; its `sender` is the only identity the engine trusts.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
