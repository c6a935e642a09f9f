//! # Cipher-Signal Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared engine wiring and addresses
//! │
//! ├── exploits/         # Attack simulations
//! │   ├── callback_forgery.rs   # Forged, replayed and substituted answers
//! │   └── access_abuse.rs       # Unauthorized and rate-limited callers
//! │
//! └── integration/      # Cross-crate flows
//!     ├── flows.rs              # Engine + event bus
//!     ├── oracle_pipeline.rs    # Channel oracle, decryptor and relay
//!     └── node_console.rs       # JSON lines through the node runtime
//!
//! tests/benches/
//! └── aggregation_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cs-tests
//!
//! # By category
//! cargo test -p cs-tests integration::
//! cargo test -p cs-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p cs-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
pub mod integration;
