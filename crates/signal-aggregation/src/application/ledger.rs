//! # Ledger State
//!
//! Engine state with one method per state-changing operation.
//!
//! Each method runs every check before its first write, and the write
//! section cannot fail. An `Err` therefore always means "nothing changed".

use crate::algorithms::{aggregate_signals, commit_aggregate, is_stale, verify_callback};
use crate::domain::{
    AccessControl, AggregateRecord, BatchLifecycle, CiphertextHandle, CooldownAction,
    CooldownTracker, DecryptionContext, DecryptionTicket, SignalError, SignalRegistry,
    SignalResult,
};
use crate::ports::{ConfidentialRuntime, DecryptionOracle};
use shared_types::{Address, BatchId, CallContext, RequestId};
use std::collections::{BTreeMap, HashMap};

/// Outcome of an accepted submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Batch the signal was stored in
    pub batch_id: BatchId,
    /// Whether an earlier signal for the same batch was replaced
    pub overwritten: bool,
}

/// Outcome of a verified callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Finalized {
    /// Batch recorded at request time
    pub batch_id: BatchId,
    /// Revealed aggregate
    pub value: u64,
}

/// The engine's explicit state.
#[derive(Debug)]
pub struct LedgerState {
    pub(crate) access: AccessControl,
    pub(crate) cooldowns: CooldownTracker,
    pub(crate) batch: BatchLifecycle,
    pub(crate) signals: SignalRegistry,
    pub(crate) aggregates: HashMap<BatchId, AggregateRecord>,
    pub(crate) contexts: BTreeMap<RequestId, DecryptionContext>,
}

impl LedgerState {
    /// Fresh ledger: `owner` set, no providers, batch `Closed(0)`.
    pub fn new(owner: Address, cooldown_secs: u64) -> SignalResult<Self> {
        Ok(Self {
            access: AccessControl::new(owner),
            cooldowns: CooldownTracker::new(cooldown_secs)?,
            batch: BatchLifecycle::new(),
            signals: SignalRegistry::new(),
            aggregates: HashMap::new(),
            contexts: BTreeMap::new(),
        })
    }

    /// Owner only. Returns the previous cooldown.
    pub fn set_cooldown(&mut self, caller: &Address, cooldown_secs: u64) -> SignalResult<u64> {
        self.access.ensure_owner(caller)?;
        self.cooldowns.set_cooldown(cooldown_secs)
    }

    /// Owner only, not paused.
    pub fn open_batch(&mut self, caller: &Address) -> SignalResult<BatchId> {
        self.access.ensure_owner(caller)?;
        self.access.ensure_not_paused()?;
        self.batch.open_batch()
    }

    /// Owner only, not paused.
    pub fn close_batch(&mut self, caller: &Address) -> SignalResult<BatchId> {
        self.access.ensure_owner(caller)?;
        self.access.ensure_not_paused()?;
        self.batch.close_batch()
    }

    /// Checks, in order: provider, pause, open batch, submission cooldown.
    pub fn submit_signal(
        &mut self,
        ctx: &CallContext,
        ciphertext: CiphertextHandle,
    ) -> SignalResult<Submission> {
        self.access.ensure_provider(&ctx.sender)?;
        self.access.ensure_not_paused()?;
        let batch_id = self.batch.ensure_open()?;
        self.cooldowns
            .ensure_ready(&ctx.sender, CooldownAction::Submission, ctx.timestamp)?;

        let previous = self.signals.store(ctx.sender, batch_id, ciphertext);
        self.cooldowns
            .stamp(ctx.sender, CooldownAction::Submission, ctx.timestamp);

        Ok(Submission {
            batch_id,
            overwritten: previous.is_some(),
        })
    }

    /// Aggregate the current batch over authorized providers and request
    /// decryption of the result.
    ///
    /// Runtime and oracle are called before anything is written; the
    /// aggregate, the context and the cooldown stamp are committed together.
    pub fn aggregate_and_request<R, O>(
        &mut self,
        ctx: &CallContext,
        runtime: &R,
        oracle: &O,
        contract_identity: &Address,
    ) -> SignalResult<DecryptionTicket>
    where
        R: ConfidentialRuntime + ?Sized,
        O: DecryptionOracle + ?Sized,
    {
        self.access.ensure_not_paused()?;
        let batch_id = self.batch.ensure_open()?;
        self.cooldowns
            .ensure_ready(&ctx.sender, CooldownAction::DecryptionRequest, ctx.timestamp)?;

        let contributions = self.signals.contributions(batch_id, self.access.providers());
        let aggregation = aggregate_signals(runtime, batch_id, &contributions)?;
        if !runtime.is_initialized(&aggregation.handle) {
            return Err(SignalError::NotInitialized);
        }

        let record = AggregateRecord::next(aggregation.handle, self.aggregates.get(&batch_id));
        let state_hash = commit_aggregate(&record, contract_identity);
        let request_id = oracle.request_decryption(&[record.handle])?;
        if self.contexts.contains_key(&request_id) {
            return Err(SignalError::DuplicateRequest(request_id));
        }

        self.aggregates.insert(batch_id, record);
        self.contexts.insert(
            request_id,
            DecryptionContext::new(
                request_id,
                batch_id,
                state_hash,
                aggregation.contributors,
                ctx.timestamp,
            ),
        );
        self.cooldowns
            .stamp(ctx.sender, CooldownAction::DecryptionRequest, ctx.timestamp);

        Ok(DecryptionTicket {
            request_id,
            batch_id,
            state_hash,
            contributors: aggregation.contributors,
        })
    }

    /// Verify a callback and finalize its context.
    pub fn apply_callback<O>(
        &mut self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &[u8],
        oracle: &O,
        contract_identity: &Address,
    ) -> SignalResult<Finalized>
    where
        O: DecryptionOracle + ?Sized,
    {
        let context = self
            .contexts
            .get_mut(&request_id)
            .ok_or(SignalError::UnknownRequest(request_id))?;

        let value = verify_callback(
            &*context,
            self.aggregates.get(&context.batch_id),
            contract_identity,
            oracle,
            cleartexts,
            proof,
        )?;

        context.finalize(value);
        Ok(Finalized {
            batch_id: context.batch_id,
            value,
        })
    }

    /// Aggregate for `batch_id`. Batches beyond the current one are invalid.
    pub fn aggregated_signal(&self, batch_id: BatchId) -> SignalResult<Option<CiphertextHandle>> {
        let current = self.batch.current();
        if batch_id > current {
            return Err(SignalError::InvalidBatch {
                requested: batch_id,
                current,
            });
        }
        Ok(self.aggregates.get(&batch_id).map(|record| record.handle))
    }

    /// Requests without a verified callback, ascending.
    pub fn pending_requests(&self) -> Vec<RequestId> {
        self.contexts
            .values()
            .filter(|context| context.is_pending())
            .map(|context| context.request_id)
            .collect()
    }

    /// Whether `request_id` is pending and can no longer pass verification.
    pub fn is_stale(&self, request_id: RequestId, contract_identity: &Address) -> bool {
        self.contexts.get(&request_id).is_some_and(|context| {
            is_stale(
                context,
                self.aggregates.get(&context.batch_id),
                contract_identity,
            )
        })
    }
}
