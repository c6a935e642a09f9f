//! # Rate Limiter
//!
//! Per-address cooldowns, tracked independently for each rate limited
//! action.

use super::errors::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Timestamp};
use std::collections::HashMap;
use std::fmt;

/// Default cooldown between two actions of the same kind (seconds).
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

/// Actions subject to a cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooldownAction {
    /// Submitting a signal.
    Submission,
    /// Requesting aggregation and decryption.
    DecryptionRequest,
}

impl fmt::Display for CooldownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission => write!(f, "submission"),
            Self::DecryptionRequest => write!(f, "decryption_request"),
        }
    }
}

/// Last action timestamps and the shared cooldown length.
#[derive(Clone, Debug)]
pub struct CooldownTracker {
    cooldown_secs: u64,
    last_action: HashMap<(Address, CooldownAction), Timestamp>,
}

impl CooldownTracker {
    /// Create a tracker. `cooldown_secs` must be positive.
    pub fn new(cooldown_secs: u64) -> SignalResult<Self> {
        if cooldown_secs == 0 {
            return Err(SignalError::InvalidCooldown);
        }
        Ok(Self {
            cooldown_secs,
            last_action: HashMap::new(),
        })
    }

    /// Current cooldown in seconds.
    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    /// Replace the cooldown. Returns the previous value.
    pub fn set_cooldown(&mut self, cooldown_secs: u64) -> SignalResult<u64> {
        if cooldown_secs == 0 {
            return Err(SignalError::InvalidCooldown);
        }
        let previous = self.cooldown_secs;
        self.cooldown_secs = cooldown_secs;
        Ok(previous)
    }

    /// When `address` last performed `action`.
    pub fn last_action_time(&self, address: &Address, action: CooldownAction) -> Option<Timestamp> {
        self.last_action.get(&(*address, action)).copied()
    }

    /// Earliest timestamp at which `address` may perform `action` again.
    /// `None` if it never performed the action.
    pub fn ready_at(&self, address: &Address, action: CooldownAction) -> Option<Timestamp> {
        self.last_action_time(address, action)
            .map(|last| last.saturating_add(self.cooldown_secs))
    }

    /// Fail with `CooldownActive` unless `now >= last + cooldown`.
    pub fn ensure_ready(
        &self,
        address: &Address,
        action: CooldownAction,
        now: Timestamp,
    ) -> SignalResult<()> {
        match self.ready_at(address, action) {
            Some(ready_at) if now < ready_at => Err(SignalError::CooldownActive {
                action,
                ready_at,
                now,
            }),
            _ => Ok(()),
        }
    }

    /// Record that `address` performed `action` at `now`.
    pub fn stamp(&mut self, address: Address, action: CooldownAction, now: Timestamp) {
        self.last_action.insert((address, action), now);
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            last_action: HashMap::new(),
        }
    }
}
