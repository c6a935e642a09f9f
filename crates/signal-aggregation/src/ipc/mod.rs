//! # IPC
//!
//! JSON transaction envelope and dispatcher.

pub mod handler;
pub mod payloads;

pub use handler::{IpcError, TransactionHandler};
pub use payloads::{CallOutcome, CallReceipt, SignalCall, SignalTransaction};
