//! # Development Decryptor
//!
//! Out-of-band side of the channel oracle. Receives decryption jobs,
//! decrypts them with the in-memory runtime, signs the result with the
//! shared proof key and hands it to the [`CallbackRelay`](crate::relay::CallbackRelay).

use std::sync::Arc;
use std::time::Duration;

use signal_aggregation::{DecryptionJob, InMemoryConfidentialRuntime, ProofKey};
use signal_telemetry::{log_request_event, ORACLE_BACKLOG};
use tokio::sync::mpsc;

/// A signed oracle answer, ready for the engine's decryption callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleCallback {
    /// Request being answered
    pub request_id: u64,
    /// Concatenated 32-byte cleartext words
    pub cleartexts: Vec<u8>,
    /// Proof over `(request_id, cleartexts)`
    pub proof: Vec<u8>,
}

/// Decrypts jobs and produces signed callbacks.
pub struct DevDecryptor {
    runtime: Arc<InMemoryConfidentialRuntime>,
    key: ProofKey,
    delay: Duration,
}

impl DevDecryptor {
    /// Create a decryptor answering after `delay`.
    pub fn new(runtime: Arc<InMemoryConfidentialRuntime>, key: ProofKey, delay: Duration) -> Self {
        Self {
            runtime,
            key,
            delay,
        }
    }

    /// Answer one job. `None` if a handle could not be decrypted.
    pub fn answer(&self, job: &DecryptionJob) -> Option<OracleCallback> {
        match self.runtime.decrypt(&job.handles) {
            Ok(cleartexts) => {
                let proof = self.key.sign(job.request_id, &cleartexts);
                Some(OracleCallback {
                    request_id: job.request_id,
                    cleartexts,
                    proof,
                })
            }
            Err(err) => {
                log_request_event!(error, "decryptor", "Decryption failed", job.request_id, error = %err);
                None
            }
        }
    }

    /// Serve jobs until the job channel or the callback channel closes.
    pub async fn run(
        self,
        mut jobs: mpsc::UnboundedReceiver<DecryptionJob>,
        callbacks: mpsc::UnboundedSender<OracleCallback>,
    ) {
        while let Some(job) = jobs.recv().await {
            ORACLE_BACKLOG.inc();
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let Some(callback) = self.answer(&job) else {
                ORACLE_BACKLOG.dec();
                continue;
            };

            log_request_event!(debug, "decryptor", "Answer ready", job.request_id);
            if callbacks.send(callback).is_err() {
                tracing::warn!("[decryptor] Callback channel closed, stopping");
                break;
            }
        }
    }
}
