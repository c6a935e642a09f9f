//! # Outbound Ports
//!
//! Collaborators supplied by the confidential-computing runtime.
//!
//! Both ports are synchronous: the runtime's `add` is a local operation and
//! a decryption request only hands work to the oracle, whose answer comes
//! back later as an independent callback.

use crate::domain::{CiphertextHandle, SignalError, SignalResult};
use parking_lot::Mutex;
use shared_types::RequestId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Homomorphic operations on opaque ciphertext handles.
pub trait ConfidentialRuntime: Send + Sync {
    /// Homomorphic addition. Must be commutative and associative.
    fn add(&self, lhs: &CiphertextHandle, rhs: &CiphertextHandle)
        -> SignalResult<CiphertextHandle>;

    /// Whether `handle` refers to an initialized ciphertext.
    fn is_initialized(&self, handle: &CiphertextHandle) -> bool;
}

/// Asynchronous decryption oracle.
pub trait DecryptionOracle: Send + Sync {
    /// Queue decryption of `handles`. Returns the request id immediately;
    /// the cleartext is delivered later through the decryption callback.
    fn request_decryption(&self, handles: &[CiphertextHandle]) -> SignalResult<RequestId>;

    /// Check that `proof` attests `cleartexts` as the decryption committed
    /// to under `request_id`.
    fn verify_proof(&self, request_id: RequestId, cleartexts: &[u8], proof: &[u8]) -> bool;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Proof bytes accepted by [`MockDecryptionOracle`].
pub const MOCK_VALID_PROOF: &[u8] = b"mock-oracle-proof";

/// Mock oracle for testing.
///
/// Assigns ids 1, 2, 3, ... unless pinned to a fixed id, records every
/// request and accepts exactly [`MOCK_VALID_PROOF`].
#[derive(Default)]
pub struct MockDecryptionOracle {
    next_id: AtomicU64,
    fixed_request_id: Option<RequestId>,
    should_fail: bool,
    requests: Mutex<Vec<(RequestId, Vec<CiphertextHandle>)>>,
}

impl MockDecryptionOracle {
    /// Oracle with sequential ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle that rejects every request.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Oracle that always answers with `request_id`.
    pub fn with_fixed_request_id(request_id: RequestId) -> Self {
        Self {
            fixed_request_id: Some(request_id),
            ..Self::default()
        }
    }

    /// Proof accepted by this oracle.
    pub fn valid_proof(&self) -> Vec<u8> {
        MOCK_VALID_PROOF.to_vec()
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<(RequestId, Vec<CiphertextHandle>)> {
        self.requests.lock().clone()
    }
}

impl DecryptionOracle for MockDecryptionOracle {
    fn request_decryption(&self, handles: &[CiphertextHandle]) -> SignalResult<RequestId> {
        if self.should_fail {
            return Err(SignalError::Oracle("Mock failure".to_string()));
        }

        let request_id = self
            .fixed_request_id
            .unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.requests.lock().push((request_id, handles.to_vec()));
        Ok(request_id)
    }

    fn verify_proof(&self, _request_id: RequestId, _cleartexts: &[u8], proof: &[u8]) -> bool {
        proof == MOCK_VALID_PROOF
    }
}
