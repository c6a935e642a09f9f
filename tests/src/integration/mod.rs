//! # Integration Tests
//!
//! Cross-crate flows: the engine, the event bus, the oracle pipeline and
//! the node console.

pub mod flows;
pub mod oracle_pipeline;
