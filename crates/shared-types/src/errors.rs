//! # Error Types
//!
//! Errors raised while decoding shared identity types.

use thiserror::Error;

/// Failure to parse a hex-encoded address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Input was not valid hexadecimal.
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),

    /// Decoded input had the wrong length.
    #[error("Invalid address length: expected 20 bytes, got {got}")]
    InvalidLength { got: usize },
}
