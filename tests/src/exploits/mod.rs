//! # Exploit Simulations
//!
//! Adversarial inputs against the engine. Every attack must fail with a
//! typed error and leave the ledger exactly as it was.

pub mod access_abuse;
