//! # Core Entities
//!
//! Identifiers shared by every crate in the workspace.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `CallContext`
//! - **Epochs**: `BatchId`
//! - **Oracle**: `RequestId`, `Hash`

use crate::errors::AddressParseError;
use serde::{Deserialize, Serialize};

/// A 32-byte hash (Keccak-256).
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Batch (epoch) identifier. Monotonic, starts at 0.
pub type BatchId = u64;

/// Identifier assigned by the decryption oracle to a request.
pub type RequestId = u64;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// The all-zero address. Never a valid owner or provider.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Execution context of a single state-changing call.
///
/// Mirrors a transaction envelope: the sender is authenticated upstream and
/// the timestamp is the ledger time at which the call is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Authenticated caller.
    pub sender: Address,
    /// Ledger time of the call.
    pub timestamp: Timestamp,
}

impl CallContext {
    /// Create a new call context.
    #[must_use]
    pub fn new(sender: Address, timestamp: Timestamp) -> Self {
        Self { sender, timestamp }
    }
}

/// Render an address as `0x`-prefixed lowercase hex.
#[must_use]
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Parse a hex address, with or without the `0x` prefix.
pub fn parse_address(input: &str) -> Result<Address, AddressParseError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != 20 {
        return Err(AddressParseError::InvalidLength { got: bytes.len() });
    }
    let mut address = ZERO_ADDRESS;
    address.copy_from_slice(&bytes);
    Ok(address)
}
