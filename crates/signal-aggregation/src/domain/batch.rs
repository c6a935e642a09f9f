//! # Batch Lifecycle
//!
//! A single global batch id and open flag.
//!
//! ```text
//! Closed(0) --open--> Open(0) --close--> Closed(0) --open--> Open(1)
//!                        |
//!                        +--open--> Open(1)   (advances without a close)
//! ```
//!
//! The first open of a closed batch keeps its id; opening while already
//! open skips the close and advances to the next id.

use super::errors::{SignalError, SignalResult};
use super::invariants::invariant_batch_monotonic;
use serde::{Deserialize, Serialize};
use shared_types::BatchId;

/// Observable batch state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    /// Batch exists but does not accept submissions.
    Closed(BatchId),
    /// Batch accepts submissions and aggregation.
    Open(BatchId),
}

/// Current batch id and open flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLifecycle {
    current: BatchId,
    open: bool,
}

impl BatchLifecycle {
    /// Start at `Closed(0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current batch id.
    pub fn current(&self) -> BatchId {
        self.current
    }

    /// Whether the current batch is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current state.
    pub fn state(&self) -> BatchState {
        if self.open {
            BatchState::Open(self.current)
        } else {
            BatchState::Closed(self.current)
        }
    }

    /// Return the current batch id if it is open.
    pub fn ensure_open(&self) -> SignalResult<BatchId> {
        if !self.open {
            return Err(SignalError::BatchNotOpen(self.current));
        }
        Ok(self.current)
    }

    /// Open a batch. Returns the id of the now-open batch.
    pub fn open_batch(&mut self) -> SignalResult<BatchId> {
        let next = if self.open {
            self.current
                .checked_add(1)
                .ok_or(SignalError::InvalidBatch {
                    requested: self.current,
                    current: self.current,
                })?
        } else {
            self.current
        };
        invariant_batch_monotonic(self.current, next)?;

        self.current = next;
        self.open = true;
        Ok(next)
    }

    /// Close the current batch. Returns its id.
    pub fn close_batch(&mut self) -> SignalResult<BatchId> {
        let id = self.ensure_open()?;
        self.open = false;
        Ok(id)
    }
}
