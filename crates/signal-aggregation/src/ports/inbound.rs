//! # Inbound Ports
//!
//! API exposed by the signal aggregation engine.

use crate::domain::{
    BatchState, CiphertextHandle, DecryptionContext, DecryptionTicket, SignalResult,
};
use async_trait::async_trait;
use shared_types::{Address, BatchId, CallContext, RequestId, Timestamp};

/// Signal aggregation API - inbound port.
///
/// State-changing calls take a [`CallContext`] carrying the authenticated
/// caller and the call timestamp. Each call is applied atomically: on error
/// nothing changes.
#[async_trait]
pub trait SignalAggregationApi: Send + Sync {
    // ---- Admin -------------------------------------------------------------

    /// Hand ownership to `new_owner`.
    async fn transfer_ownership(&self, ctx: CallContext, new_owner: Address) -> SignalResult<()>;

    /// Authorize a provider.
    async fn add_provider(&self, ctx: CallContext, provider: Address) -> SignalResult<()>;

    /// Revoke a provider.
    async fn remove_provider(&self, ctx: CallContext, provider: Address) -> SignalResult<()>;

    /// Pause submissions, batch transitions and aggregation.
    async fn pause(&self, ctx: CallContext) -> SignalResult<()>;

    /// Resume.
    async fn unpause(&self, ctx: CallContext) -> SignalResult<()>;

    /// Set the cooldown applied to submissions and decryption requests.
    async fn set_cooldown(&self, ctx: CallContext, cooldown_secs: u64) -> SignalResult<()>;

    /// Open a batch. Returns the open batch id.
    async fn open_batch(&self, ctx: CallContext) -> SignalResult<BatchId>;

    /// Close the current batch. Returns its id.
    async fn close_batch(&self, ctx: CallContext) -> SignalResult<BatchId>;

    // ---- Provider ----------------------------------------------------------

    /// Store the caller's signal for the current batch.
    async fn submit_signal(
        &self,
        ctx: CallContext,
        ciphertext: CiphertextHandle,
    ) -> SignalResult<BatchId>;

    // ---- Anyone ------------------------------------------------------------

    /// Aggregate the current batch and request decryption of the aggregate.
    async fn aggregate_and_request_decryption(
        &self,
        ctx: CallContext,
    ) -> SignalResult<DecryptionTicket>;

    // ---- Oracle ------------------------------------------------------------

    /// Deliver a decryption result. Returns the revealed value.
    async fn decryption_callback(
        &self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &[u8],
    ) -> SignalResult<u64>;

    // ---- Views -------------------------------------------------------------

    /// Current owner.
    fn owner(&self) -> Address;

    /// Whether `address` is an authorized provider.
    fn is_provider(&self, address: &Address) -> bool;

    /// Authorized providers in ascending order.
    fn providers(&self) -> Vec<Address>;

    /// Whether the engine is paused.
    fn is_paused(&self) -> bool;

    /// Current cooldown in seconds.
    fn cooldown_secs(&self) -> u64;

    /// Last submission time of `provider`.
    fn last_submission_time(&self, provider: &Address) -> Option<Timestamp>;

    /// Last decryption request time of `caller`.
    fn last_decryption_request_time(&self, caller: &Address) -> Option<Timestamp>;

    /// Current batch id.
    fn current_batch(&self) -> BatchId;

    /// Whether the current batch is open.
    fn is_batch_open(&self) -> bool;

    /// Current batch state.
    fn batch_state(&self) -> BatchState;

    /// Signal stored by `provider` in `batch_id`.
    fn signal_of(&self, provider: &Address, batch_id: BatchId) -> Option<CiphertextHandle>;

    /// Aggregate computed for `batch_id`, if any.
    fn aggregated_signal(&self, batch_id: BatchId) -> SignalResult<Option<CiphertextHandle>>;

    /// Context recorded for `request_id`.
    fn decryption_context(&self, request_id: RequestId) -> Option<DecryptionContext>;

    /// Requests without a verified callback, ascending.
    fn pending_requests(&self) -> Vec<RequestId>;

    /// Whether a pending request can no longer pass the state-integrity check.
    fn is_stale(&self, request_id: RequestId) -> bool;
}
