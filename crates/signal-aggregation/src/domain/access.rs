//! # Access Control
//!
//! Owner identity, the registered-provider set and the global pause flag.
//!
//! Every mutator validates first and writes last, so a failed call leaves
//! the state untouched.

use super::errors::{SignalError, SignalResult};
use super::invariants::invariant_nonzero_address;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeSet;

/// Owner, provider allow-list and pause flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    providers: BTreeSet<Address>,
    paused: bool,
}

impl AccessControl {
    /// Create access control owned by `owner`, with no providers, unpaused.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            providers: BTreeSet::new(),
            paused: false,
        }
    }

    /// Current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Whether `address` is an authorized provider.
    pub fn is_provider(&self, address: &Address) -> bool {
        self.providers.contains(address)
    }

    /// Authorized providers in ascending address order.
    pub fn providers(&self) -> impl Iterator<Item = &Address> {
        self.providers.iter()
    }

    /// Number of authorized providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Whether the engine is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fail unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> SignalResult<()> {
        if *caller != self.owner {
            return Err(SignalError::NotOwner(*caller));
        }
        Ok(())
    }

    /// Fail unless `caller` is an authorized provider.
    pub fn ensure_provider(&self, caller: &Address) -> SignalResult<()> {
        if !self.is_provider(caller) {
            return Err(SignalError::NotProvider(*caller));
        }
        Ok(())
    }

    /// Fail if paused.
    pub fn ensure_not_paused(&self) -> SignalResult<()> {
        if self.paused {
            return Err(SignalError::Paused);
        }
        Ok(())
    }

    /// Hand ownership to `new_owner` in a single step. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> SignalResult<Address> {
        self.ensure_owner(caller)?;
        invariant_nonzero_address(&new_owner)?;

        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }

    /// Authorize `provider`. Returns `false` if it was already authorized.
    pub fn add_provider(&mut self, caller: &Address, provider: Address) -> SignalResult<bool> {
        self.ensure_owner(caller)?;
        invariant_nonzero_address(&provider)?;

        Ok(self.providers.insert(provider))
    }

    /// Revoke `provider`.
    pub fn remove_provider(&mut self, caller: &Address, provider: &Address) -> SignalResult<()> {
        self.ensure_owner(caller)?;
        self.ensure_provider(provider)?;

        self.providers.remove(provider);
        Ok(())
    }

    /// Set the pause flag.
    pub fn pause(&mut self, caller: &Address) -> SignalResult<()> {
        self.ensure_owner(caller)?;
        self.ensure_not_paused()?;

        self.paused = true;
        Ok(())
    }

    /// Clear the pause flag.
    pub fn unpause(&mut self, caller: &Address) -> SignalResult<()> {
        self.ensure_owner(caller)?;
        if !self.paused {
            return Err(SignalError::NotPaused);
        }

        self.paused = false;
        Ok(())
    }
}
