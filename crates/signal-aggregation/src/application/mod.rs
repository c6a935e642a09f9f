//! # Application Layer
//!
//! The ledger state object and the service implementing the inbound API.

pub mod ledger;
pub mod service;

pub use ledger::{Finalized, LedgerState, Submission};
pub use service::SignalAggregationService;
