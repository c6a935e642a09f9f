//! # Node Runtime Library
//!
//! Exposes the node's building blocks for testing. The entry point is the
//! `signal-node` binary.
//!
//! - `config` - Layered node configuration
//! - `decryptor` - Development decryptor behind the channel oracle
//! - `relay` - Oracle callback delivery into the engine
//! - `runtime` - Wiring, background tasks and input handling

#![warn(missing_docs)]

pub mod config;
pub mod decryptor;
pub mod relay;
pub mod runtime;

pub use config::{ConfigError, NodeConfig, NodeConfigFile, OracleConfig, DEV_OWNER};
pub use decryptor::{DevDecryptor, OracleCallback};
pub use relay::CallbackRelay;
pub use runtime::{Engine, NodeCommand, NodeResponse, NodeRuntime};
