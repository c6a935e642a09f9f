//! # Callback Relay
//!
//! Delivers oracle answers to the engine's decryption callback. Answers
//! arrive unordered and are untrusted; the engine's verifier decides.

use std::sync::Arc;

use signal_aggregation::{SignalAggregationApi, SignalError};
use signal_telemetry::{log_request_event, CALLBACKS_REJECTED, CALLBACKS_RELAYED, ORACLE_BACKLOG};
use tokio::sync::mpsc;

use crate::decryptor::OracleCallback;

/// Relays callbacks into an engine.
pub struct CallbackRelay<A>
where
    A: SignalAggregationApi,
{
    engine: Arc<A>,
}

impl<A> CallbackRelay<A>
where
    A: SignalAggregationApi,
{
    /// Create a relay for `engine`.
    pub fn new(engine: Arc<A>) -> Self {
        Self { engine }
    }

    /// Deliver one callback.
    pub async fn deliver(&self, callback: OracleCallback) -> Result<u64, SignalError> {
        CALLBACKS_RELAYED.inc();
        let result = self
            .engine
            .decryption_callback(callback.request_id, &callback.cleartexts, &callback.proof)
            .await;

        match &result {
            Ok(value) => {
                log_request_event!(info, "relay", "Aggregate revealed", callback.request_id, value = *value);
            }
            Err(err) => {
                CALLBACKS_REJECTED.inc();
                log_request_event!(warn, "relay", "Callback rejected", callback.request_id, reason = err.reason());
            }
        }
        result
    }

    /// Deliver callbacks until the channel closes.
    pub async fn run(self, mut callbacks: mpsc::UnboundedReceiver<OracleCallback>) {
        while let Some(callback) = callbacks.recv().await {
            let _ = self.deliver(callback).await;
            ORACLE_BACKLOG.dec();
        }
    }
}
