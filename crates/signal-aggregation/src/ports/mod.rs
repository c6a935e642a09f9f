//! # Ports
//!
//! Inbound API and outbound collaborator traits.

pub mod inbound;
pub mod outbound;

pub use inbound::SignalAggregationApi;
pub use outbound::{ConfidentialRuntime, DecryptionOracle, MockDecryptionOracle, MOCK_VALID_PROOF};
