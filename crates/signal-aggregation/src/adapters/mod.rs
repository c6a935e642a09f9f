//! # Adapters
//!
//! Concrete implementations of the outbound ports.

pub mod channel_oracle;
pub mod in_memory_runtime;

pub use channel_oracle::{ChannelDecryptionOracle, DecryptionJob, ProofKey};
pub use in_memory_runtime::InMemoryConfidentialRuntime;
