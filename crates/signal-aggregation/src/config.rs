//! # Aggregation Configuration
//!
//! Settings fixed when the engine is constructed.

use crate::domain::{invariant_nonzero_address, SignalError, SignalResult, DEFAULT_COOLDOWN_SECS};
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Default engine instance identity.
pub const DEFAULT_CONTRACT_IDENTITY: Address = [
    0xc5, 0x19, 0x4a, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
];

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Initial cooldown for submissions and decryption requests (seconds)
    pub cooldown_secs: u64,
    /// Identity of this engine instance, bound into every state commitment
    pub contract_identity: Address,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            contract_identity: DEFAULT_CONTRACT_IDENTITY,
        }
    }
}

impl AggregationConfig {
    /// Config for testing with a short cooldown.
    pub fn for_testing() -> Self {
        Self {
            cooldown_secs: 10,
            contract_identity: [0x5a; 20],
        }
    }

    /// Reject a zero cooldown or a zero identity.
    pub fn validate(&self) -> SignalResult<()> {
        if self.cooldown_secs == 0 {
            return Err(SignalError::InvalidCooldown);
        }
        invariant_nonzero_address(&self.contract_identity)
    }
}
