//! Channel Decryption Oracle
//!
//! Implements `DecryptionOracle` by forwarding each request over a tokio
//! channel to an out-of-band decryptor. The decryptor answers through the
//! engine's decryption callback, signing each result with a shared
//! [`ProofKey`].

use crate::domain::{CiphertextHandle, SignalError, SignalResult};
use crate::ports::DecryptionOracle;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::RequestId;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Decryption work handed to the decryptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionJob {
    /// Request id assigned by the oracle
    pub request_id: RequestId,
    /// Ciphertexts to decrypt
    pub handles: Vec<CiphertextHandle>,
}

/// Key shared between the oracle and its decryptor.
///
/// A proof is `keccak256("cs-oracle-proof" || key || request_id || len || cleartexts)`.
#[derive(Clone)]
pub struct ProofKey([u8; 32]);

impl ProofKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Proof over `cleartexts` for `request_id`.
    pub fn sign(&self, request_id: RequestId, cleartexts: &[u8]) -> Vec<u8> {
        let mut hasher = Keccak256::new();
        hasher.update(b"cs-oracle-proof");
        hasher.update(self.0);
        hasher.update(request_id.to_be_bytes());
        hasher.update((cleartexts.len() as u64).to_be_bytes());
        hasher.update(cleartexts);
        hasher.finalize().to_vec()
    }

    /// Check `proof` in constant time.
    pub fn verify(&self, request_id: RequestId, cleartexts: &[u8], proof: &[u8]) -> bool {
        let expected = self.sign(request_id, cleartexts);
        if expected.len() != proof.len() {
            return false;
        }
        expected
            .iter()
            .zip(proof)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for ProofKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProofKey(..)")
    }
}

/// Oracle that forwards requests to a decryptor task.
pub struct ChannelDecryptionOracle {
    next_id: AtomicU64,
    sender: mpsc::UnboundedSender<DecryptionJob>,
    key: ProofKey,
}

impl ChannelDecryptionOracle {
    /// Create the oracle and the receiving end for the decryptor.
    pub fn new(key: ProofKey) -> (Self, mpsc::UnboundedReceiver<DecryptionJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let oracle = Self {
            next_id: AtomicU64::new(0),
            sender,
            key,
        };
        (oracle, receiver)
    }

    /// Number of request ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

impl DecryptionOracle for ChannelDecryptionOracle {
    fn request_decryption(&self, handles: &[CiphertextHandle]) -> SignalResult<RequestId> {
        let request_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let job = DecryptionJob {
            request_id,
            handles: handles.to_vec(),
        };

        self.sender
            .send(job)
            .map_err(|_| SignalError::Oracle("Decryptor channel closed".to_string()))?;

        debug!("[oracle] Forwarded request {} ({} handles)", request_id, handles.len());
        Ok(request_id)
    }

    fn verify_proof(&self, request_id: RequestId, cleartexts: &[u8], proof: &[u8]) -> bool {
        self.key.verify(request_id, cleartexts, proof)
    }
}
