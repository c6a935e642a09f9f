//! In-Memory Confidential Runtime
//!
//! Implements `ConfidentialRuntime` for development and testing.
//!
//! Handles are random-looking Keccak digests; the values behind them live
//! only inside this adapter. The engine never sees them.

use crate::algorithms::encode_cleartext;
use crate::domain::{CiphertextHandle, SignalError, SignalResult};
use crate::ports::ConfidentialRuntime;
use parking_lot::RwLock;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory confidential runtime.
///
/// In production the handles would reference ciphertexts held by the
/// confidential-computing coprocessor.
pub struct InMemoryConfidentialRuntime {
    /// handle -> plaintext value
    values: RwLock<HashMap<CiphertextHandle, u64>>,
    /// Per-instance salt so two runtimes never mint the same handle.
    salt: [u8; 32],
    nonce: AtomicU64,
}

impl InMemoryConfidentialRuntime {
    /// Create an empty runtime.
    pub fn new() -> Self {
        let mut salt = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            values: RwLock::new(HashMap::new()),
            salt,
            nonce: AtomicU64::new(0),
        }
    }

    /// Encrypt `value`, returning a fresh handle.
    pub fn encrypt(&self, value: u64) -> CiphertextHandle {
        let handle = self.mint_handle();
        self.values.write().insert(handle, value);
        handle
    }

    /// Plaintext behind `handle`. Only the decryptor side calls this.
    pub fn reveal(&self, handle: &CiphertextHandle) -> Option<u64> {
        self.values.read().get(handle).copied()
    }

    /// Decrypt `handles` into concatenated 32-byte words.
    pub fn decrypt(&self, handles: &[CiphertextHandle]) -> SignalResult<Vec<u8>> {
        let values = self.values.read();
        let mut cleartexts = Vec::with_capacity(handles.len() * 32);
        for handle in handles {
            let value = values
                .get(handle)
                .ok_or_else(|| SignalError::Runtime(format!("Unknown ciphertext {}", handle)))?;
            cleartexts.extend(encode_cleartext(*value));
        }
        Ok(cleartexts)
    }

    /// Number of live ciphertexts.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether no ciphertext exists.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    fn mint_handle(&self) -> CiphertextHandle {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Keccak256::new();
        hasher.update(b"cs-ciphertext");
        hasher.update(self.salt);
        hasher.update(nonce.to_be_bytes());
        CiphertextHandle::new(hasher.finalize().into())
    }
}

impl Default for InMemoryConfidentialRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfidentialRuntime for InMemoryConfidentialRuntime {
    fn add(
        &self,
        lhs: &CiphertextHandle,
        rhs: &CiphertextHandle,
    ) -> SignalResult<CiphertextHandle> {
        let sum = {
            let values = self.values.read();
            let a = values
                .get(lhs)
                .ok_or_else(|| SignalError::Runtime(format!("Unknown ciphertext {}", lhs)))?;
            let b = values
                .get(rhs)
                .ok_or_else(|| SignalError::Runtime(format!("Unknown ciphertext {}", rhs)))?;
            a.wrapping_add(*b)
        };

        let handle = self.mint_handle();
        self.values.write().insert(handle, sum);
        trace!("[runtime] add {} + {} -> {}", lhs, rhs, handle);
        Ok(handle)
    }

    fn is_initialized(&self, handle: &CiphertextHandle) -> bool {
        self.values.read().contains_key(handle)
    }
}
