//! Signal Aggregation Service - engine entry point
//!
//! Serializes every call through one write lock on the ledger and records
//! metrics and logs for accepted and rejected calls.
//!
//! Mutators also hold an async commit lock from before their ledger write
//! until their event is published. The ledger lock is never held across an
//! `.await`; the commit lock keeps bus order equal to ledger order, so a
//! callback relayed before `DecryptionRequested` went out still publishes
//! its `DecryptionCompleted` after it.

use super::ledger::LedgerState;
use crate::config::AggregationConfig;
use crate::domain::{
    invariant_nonzero_address, BatchState, CiphertextHandle, CooldownAction, DecryptionContext,
    DecryptionTicket, SignalError, SignalResult,
};
use crate::metrics;
use crate::ports::{ConfidentialRuntime, DecryptionOracle, SignalAggregationApi};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, SignalEvent};
use shared_types::{format_address, Address, BatchId, CallContext, RequestId, Timestamp};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Signal aggregation service.
///
/// Owns the ledger; collaborators are shared through `Arc`.
pub struct SignalAggregationService<R, O>
where
    R: ConfidentialRuntime,
    O: DecryptionOracle,
{
    config: AggregationConfig,
    state: RwLock<LedgerState>,
    /// Held from ledger write to event publication
    commit_order: Mutex<()>,
    runtime: Arc<R>,
    oracle: Arc<O>,
    events: Arc<dyn EventPublisher>,
}

impl<R, O> SignalAggregationService<R, O>
where
    R: ConfidentialRuntime,
    O: DecryptionOracle,
{
    /// Create the engine with `owner` as its first owner.
    pub fn new(
        config: AggregationConfig,
        owner: Address,
        runtime: Arc<R>,
        oracle: Arc<O>,
        events: Arc<dyn EventPublisher>,
    ) -> SignalResult<Self> {
        config.validate()?;
        invariant_nonzero_address(&owner)?;
        let state = LedgerState::new(owner, config.cooldown_secs)?;

        info!(
            "[signal] Engine created: owner={}, identity={}, cooldown={}s",
            format_address(&owner),
            format_address(&config.contract_identity),
            config.cooldown_secs
        );

        Ok(Self {
            config,
            state: RwLock::new(state),
            commit_order: Mutex::new(()),
            runtime,
            oracle,
            events,
        })
    }

    /// Engine configuration.
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Confidential runtime in use.
    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    /// Decryption oracle in use.
    pub fn oracle(&self) -> &Arc<O> {
        &self.oracle
    }

    async fn emit(&self, event: SignalEvent) {
        let receivers = self.events.publish(event).await;
        debug!("[signal] Event delivered to {} subscribers", receivers);
    }
}

/// Log and count a rejected call, then pass the result through.
fn observe<T>(operation: &'static str, result: SignalResult<T>) -> SignalResult<T> {
    if let Err(err) = &result {
        let category = err.category().as_str();
        debug!(operation, category, "[signal] Rejected: {}", err);
        metrics::record_operation_rejected(operation, category);
    }
    result
}

#[async_trait]
impl<R, O> SignalAggregationApi for SignalAggregationService<R, O>
where
    R: ConfidentialRuntime,
    O: DecryptionOracle,
{
    async fn transfer_ownership(&self, ctx: CallContext, new_owner: Address) -> SignalResult<()> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.access.transfer_ownership(&ctx.sender, new_owner)
        };
        let previous = observe("transfer_ownership", result)?;

        // Single step: no acceptance from the new owner is required
        info!(
            "[signal] Ownership transferred: {} -> {}",
            format_address(&previous),
            format_address(&new_owner)
        );
        self.emit(SignalEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        })
        .await;
        Ok(())
    }

    async fn add_provider(&self, ctx: CallContext, provider: Address) -> SignalResult<()> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.access.add_provider(&ctx.sender, provider)
        };
        let added = observe("add_provider", result)?;

        if !added {
            debug!(
                "[signal] Provider {} already authorized",
                format_address(&provider)
            );
            return Ok(());
        }

        info!("[signal] Provider added: {}", format_address(&provider));
        self.emit(SignalEvent::ProviderAdded { provider }).await;
        Ok(())
    }

    async fn remove_provider(&self, ctx: CallContext, provider: Address) -> SignalResult<()> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.access.remove_provider(&ctx.sender, &provider)
        };
        observe("remove_provider", result)?;

        info!("[signal] Provider removed: {}", format_address(&provider));
        self.emit(SignalEvent::ProviderRemoved { provider }).await;
        Ok(())
    }

    async fn pause(&self, ctx: CallContext) -> SignalResult<()> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.access.pause(&ctx.sender)
        };
        observe("pause", result)?;

        warn!("[signal] Engine paused by {}", format_address(&ctx.sender));
        self.emit(SignalEvent::Paused { by: ctx.sender }).await;
        Ok(())
    }

    async fn unpause(&self, ctx: CallContext) -> SignalResult<()> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.access.unpause(&ctx.sender)
        };
        observe("unpause", result)?;

        info!("[signal] Engine unpaused by {}", format_address(&ctx.sender));
        self.emit(SignalEvent::Unpaused { by: ctx.sender }).await;
        Ok(())
    }

    async fn set_cooldown(&self, ctx: CallContext, cooldown_secs: u64) -> SignalResult<()> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.set_cooldown(&ctx.sender, cooldown_secs)
        };
        let previous = observe("set_cooldown", result)?;

        info!("[signal] Cooldown updated: {}s -> {}s", previous, cooldown_secs);
        self.emit(SignalEvent::CooldownUpdated {
            previous,
            current: cooldown_secs,
        })
        .await;
        Ok(())
    }

    async fn open_batch(&self, ctx: CallContext) -> SignalResult<BatchId> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.open_batch(&ctx.sender)
        };
        let batch_id = observe("open_batch", result)?;

        metrics::set_current_batch(batch_id);
        info!(batch_id, "[signal] Batch opened");
        self.emit(SignalEvent::BatchOpened { batch_id }).await;
        Ok(batch_id)
    }

    async fn close_batch(&self, ctx: CallContext) -> SignalResult<BatchId> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.close_batch(&ctx.sender)
        };
        let batch_id = observe("close_batch", result)?;

        info!(batch_id, "[signal] Batch closed");
        self.emit(SignalEvent::BatchClosed { batch_id }).await;
        Ok(batch_id)
    }

    async fn submit_signal(
        &self,
        ctx: CallContext,
        ciphertext: CiphertextHandle,
    ) -> SignalResult<BatchId> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state.submit_signal(&ctx, ciphertext)
        };
        let submission = observe("submit_signal", result)?;

        metrics::record_submission();
        debug!(
            batch_id = submission.batch_id,
            overwritten = submission.overwritten,
            "[signal] Signal submitted by {}",
            format_address(&ctx.sender)
        );
        self.emit(SignalEvent::SignalSubmitted {
            provider: ctx.sender,
            batch_id: submission.batch_id,
        })
        .await;
        Ok(submission.batch_id)
    }

    async fn aggregate_and_request_decryption(
        &self,
        ctx: CallContext,
    ) -> SignalResult<DecryptionTicket> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state
                .aggregate_and_request(
                    &ctx,
                    self.runtime.as_ref(),
                    self.oracle.as_ref(),
                    &self.config.contract_identity,
                )
                .map(|ticket| (ticket, state.pending_requests().len()))
        };
        let (ticket, pending) = observe("aggregate_and_request_decryption", result)?;

        metrics::record_aggregation();
        metrics::set_pending_requests(pending);
        info!(
            request_id = ticket.request_id,
            batch_id = ticket.batch_id,
            contributors = ticket.contributors,
            "[signal] Decryption requested, state_hash={}",
            ticket.state_hash
        );
        self.emit(SignalEvent::DecryptionRequested {
            request_id: ticket.request_id,
            batch_id: ticket.batch_id,
            contributors: ticket.contributors,
        })
        .await;
        Ok(ticket)
    }

    async fn decryption_callback(
        &self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &[u8],
    ) -> SignalResult<u64> {
        let _order = self.commit_order.lock().await;
        let result = {
            let mut state = self.state.write();
            state
                .apply_callback(
                    request_id,
                    cleartexts,
                    proof,
                    self.oracle.as_ref(),
                    &self.config.contract_identity,
                )
                .map(|finalized| (finalized, state.pending_requests().len()))
        };

        let (finalized, pending) = match result {
            Ok(done) => done,
            Err(err) => {
                if let SignalError::StateMismatch(_) = err {
                    // Orphaned by a later recomputation; it stays pending
                    warn!(
                        request_id,
                        "[signal] Stale callback: aggregate recomputed since request"
                    );
                    metrics::record_stale_callback();
                } else {
                    warn!(request_id, "[signal] Callback rejected: {}", err);
                }
                metrics::record_callback_rejected(err.reason());
                return Err(err);
            }
        };

        metrics::record_decryption_completed();
        metrics::set_pending_requests(pending);
        info!(
            request_id,
            batch_id = finalized.batch_id,
            value = finalized.value,
            "[signal] Decryption completed"
        );
        self.emit(SignalEvent::DecryptionCompleted {
            request_id,
            batch_id: finalized.batch_id,
            value: finalized.value,
        })
        .await;
        Ok(finalized.value)
    }

    fn owner(&self) -> Address {
        self.state.read().access.owner()
    }

    fn is_provider(&self, address: &Address) -> bool {
        self.state.read().access.is_provider(address)
    }

    fn providers(&self) -> Vec<Address> {
        self.state.read().access.providers().copied().collect()
    }

    fn is_paused(&self) -> bool {
        self.state.read().access.is_paused()
    }

    fn cooldown_secs(&self) -> u64 {
        self.state.read().cooldowns.cooldown_secs()
    }

    fn last_submission_time(&self, provider: &Address) -> Option<Timestamp> {
        self.state
            .read()
            .cooldowns
            .last_action_time(provider, CooldownAction::Submission)
    }

    fn last_decryption_request_time(&self, caller: &Address) -> Option<Timestamp> {
        self.state
            .read()
            .cooldowns
            .last_action_time(caller, CooldownAction::DecryptionRequest)
    }

    fn current_batch(&self) -> BatchId {
        self.state.read().batch.current()
    }

    fn is_batch_open(&self) -> bool {
        self.state.read().batch.is_open()
    }

    fn batch_state(&self) -> BatchState {
        self.state.read().batch.state()
    }

    fn signal_of(&self, provider: &Address, batch_id: BatchId) -> Option<CiphertextHandle> {
        self.state.read().signals.get(provider, batch_id)
    }

    fn aggregated_signal(&self, batch_id: BatchId) -> SignalResult<Option<CiphertextHandle>> {
        self.state.read().aggregated_signal(batch_id)
    }

    fn decryption_context(&self, request_id: RequestId) -> Option<DecryptionContext> {
        self.state.read().contexts.get(&request_id).cloned()
    }

    fn pending_requests(&self) -> Vec<RequestId> {
        self.state.read().pending_requests()
    }

    fn is_stale(&self, request_id: RequestId) -> bool {
        self.state
            .read()
            .is_stale(request_id, &self.config.contract_identity)
    }
}
