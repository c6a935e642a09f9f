//! IPC handler
//!
//! Decodes [`SignalTransaction`]s and applies them to the engine, one at a
//! time, in arrival order.

use super::payloads::{CallOutcome, CallReceipt, SignalCall, SignalTransaction};
use crate::domain::{CiphertextHandle, SignalError};
use crate::ports::SignalAggregationApi;
use shared_types::{parse_address, AddressParseError, CallContext};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

/// Transaction decoding errors.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Invalid JSON or unknown call.
    #[error("Invalid transaction: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid address field.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressParseError),

    /// Invalid hex field.
    #[error("Invalid hex field `{field}`: {message}")]
    Hex {
        /// Field name
        field: &'static str,
        /// Decoder message
        message: String,
    },

    /// Engine rejected the call.
    #[error(transparent)]
    Engine(#[from] SignalError),
}

/// Applies transactions to a [`SignalAggregationApi`].
pub struct TransactionHandler<A>
where
    A: SignalAggregationApi,
{
    engine: Arc<A>,
}

impl<A> TransactionHandler<A>
where
    A: SignalAggregationApi,
{
    /// Create a handler over `engine`.
    pub fn new(engine: Arc<A>) -> Self {
        Self { engine }
    }

    /// The engine calls are applied to.
    pub fn engine(&self) -> &Arc<A> {
        &self.engine
    }

    /// Decode and apply one JSON transaction. Never fails: every error is
    /// reported in the receipt.
    pub async fn handle_json(&self, line: &str) -> CallReceipt {
        let correlation_id = Uuid::new_v4();
        let outcome = match serde_json::from_str::<SignalTransaction>(line) {
            Ok(tx) => self.apply_traced(correlation_id, tx).await,
            Err(err) => CallOutcome::Malformed {
                message: err.to_string(),
            },
        };
        CallReceipt {
            correlation_id,
            outcome,
        }
    }

    /// Apply a decoded transaction.
    pub async fn handle(&self, tx: SignalTransaction) -> CallReceipt {
        let correlation_id = Uuid::new_v4();
        let outcome = self.apply_traced(correlation_id, tx).await;
        CallReceipt {
            correlation_id,
            outcome,
        }
    }

    async fn apply_traced(&self, correlation_id: Uuid, tx: SignalTransaction) -> CallOutcome {
        let span = info_span!(
            "signal_tx",
            correlation_id = %correlation_id,
            op = tx.call.name()
        );
        async {
            match self.apply(tx).await {
                Ok(outcome) => outcome,
                Err(IpcError::Engine(err)) => CallOutcome::from(err),
                Err(err) => {
                    debug!("[ipc] Malformed transaction: {}", err);
                    CallOutcome::Malformed {
                        message: err.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn apply(&self, tx: SignalTransaction) -> Result<CallOutcome, IpcError> {
        let SignalTransaction {
            sender,
            timestamp,
            call,
        } = tx;
        let ctx = || -> Result<CallContext, IpcError> {
            Ok(CallContext::new(parse_address(&sender)?, timestamp))
        };

        let outcome = match call {
            SignalCall::TransferOwnership { new_owner } => {
                self.engine
                    .transfer_ownership(ctx()?, parse_address(&new_owner)?)
                    .await?;
                CallOutcome::Applied
            }
            SignalCall::AddProvider { provider } => {
                self.engine
                    .add_provider(ctx()?, parse_address(&provider)?)
                    .await?;
                CallOutcome::Applied
            }
            SignalCall::RemoveProvider { provider } => {
                self.engine
                    .remove_provider(ctx()?, parse_address(&provider)?)
                    .await?;
                CallOutcome::Applied
            }
            SignalCall::Pause => {
                self.engine.pause(ctx()?).await?;
                CallOutcome::Applied
            }
            SignalCall::Unpause => {
                self.engine.unpause(ctx()?).await?;
                CallOutcome::Applied
            }
            SignalCall::SetCooldown { cooldown_secs } => {
                self.engine.set_cooldown(ctx()?, cooldown_secs).await?;
                CallOutcome::Applied
            }
            SignalCall::OpenBatch => CallOutcome::Batch {
                batch_id: self.engine.open_batch(ctx()?).await?,
            },
            SignalCall::CloseBatch => CallOutcome::Batch {
                batch_id: self.engine.close_batch(ctx()?).await?,
            },
            SignalCall::SubmitSignal { ciphertext } => {
                let handle = CiphertextHandle::from_hex(&ciphertext).map_err(|message| {
                    IpcError::Hex {
                        field: "ciphertext",
                        message,
                    }
                })?;
                CallOutcome::Batch {
                    batch_id: self.engine.submit_signal(ctx()?, handle).await?,
                }
            }
            SignalCall::AggregateAndRequestDecryption => CallOutcome::Requested(
                self.engine
                    .aggregate_and_request_decryption(ctx()?)
                    .await?,
            ),
            SignalCall::DecryptionCallback {
                request_id,
                cleartexts,
                proof,
            } => {
                // Sender is not trusted for callbacks; the proof decides
                let cleartexts = decode_hex("cleartexts", &cleartexts)?;
                let proof = decode_hex("proof", &proof)?;
                let value = self
                    .engine
                    .decryption_callback(request_id, &cleartexts, &proof)
                    .await?;
                CallOutcome::Revealed { value }
            }
        };
        Ok(outcome)
    }
}

fn decode_hex(field: &'static str, input: &str) -> Result<Vec<u8>, IpcError> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(stripped).map_err(|e| IpcError::Hex {
        field,
        message: e.to_string(),
    })
}
