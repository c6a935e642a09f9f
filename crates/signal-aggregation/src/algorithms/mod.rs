//! # Algorithms
//!
//! Aggregation fold, state commitment and callback verification.

pub mod aggregator;
pub mod callback_verifier;
pub mod commitment;

pub use aggregator::{accumulate, aggregate_signals, Aggregation};
pub use callback_verifier::{
    decode_cleartext, encode_cleartext, is_stale, verify_callback, CLEARTEXT_WORD_LEN,
};
pub use commitment::{commit_aggregate, compute_state_hash};
