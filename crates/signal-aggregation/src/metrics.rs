//! # Aggregation Metrics
//!
//! Prometheus metrics for the signal aggregation engine.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! signal-aggregation = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `signal_submissions_total` - Signals stored
//! - `signal_aggregations_total` - Aggregates computed and sent for decryption
//! - `signal_decryptions_completed_total` - Verified callbacks
//! - `signal_callbacks_rejected_total` - Rejected callbacks (by reason)
//! - `signal_stale_callbacks_total` - Callbacks for orphaned requests
//! - `signal_operations_rejected_total` - Rejected calls (by operation and category)
//! - `signal_current_batch` - Current batch id
//! - `signal_pending_requests` - Requests awaiting a verified callback

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Signals stored
    pub static ref SUBMISSIONS: IntCounter = register_int_counter!(
        "signal_submissions_total",
        "Total number of signals stored"
    )
    .expect("Failed to create SUBMISSIONS metric");

    /// Aggregates computed and sent for decryption
    pub static ref AGGREGATIONS: IntCounter = register_int_counter!(
        "signal_aggregations_total",
        "Total number of aggregates sent for decryption"
    )
    .expect("Failed to create AGGREGATIONS metric");

    /// Verified callbacks
    pub static ref DECRYPTIONS_COMPLETED: IntCounter = register_int_counter!(
        "signal_decryptions_completed_total",
        "Total number of verified decryption callbacks"
    )
    .expect("Failed to create DECRYPTIONS_COMPLETED metric");

    /// Rejected callbacks, labeled by reason
    pub static ref CALLBACKS_REJECTED: CounterVec = register_counter_vec!(
        "signal_callbacks_rejected_total",
        "Total number of rejected decryption callbacks",
        &["reason"]
    )
    .expect("Failed to create CALLBACKS_REJECTED metric");

    /// Callbacks for requests whose aggregate was recomputed
    pub static ref STALE_CALLBACKS: IntCounter = register_int_counter!(
        "signal_stale_callbacks_total",
        "Total number of callbacks for orphaned requests"
    )
    .expect("Failed to create STALE_CALLBACKS metric");

    /// Rejected calls, labeled by operation and category
    pub static ref OPERATIONS_REJECTED: CounterVec = register_counter_vec!(
        "signal_operations_rejected_total",
        "Total number of rejected engine calls",
        &["operation", "category"]
    )
    .expect("Failed to create OPERATIONS_REJECTED metric");

    /// Current batch id
    pub static ref CURRENT_BATCH: Gauge = register_gauge!(
        "signal_current_batch",
        "Current batch id"
    )
    .expect("Failed to create CURRENT_BATCH metric");

    /// Requests awaiting a verified callback
    pub static ref PENDING_REQUESTS: Gauge = register_gauge!(
        "signal_pending_requests",
        "Decryption requests awaiting a verified callback"
    )
    .expect("Failed to create PENDING_REQUESTS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a stored signal
#[cfg(feature = "metrics")]
pub fn record_submission() {
    SUBMISSIONS.inc();
}

/// Record an aggregate sent for decryption
#[cfg(feature = "metrics")]
pub fn record_aggregation() {
    AGGREGATIONS.inc();
}

/// Record a verified callback
#[cfg(feature = "metrics")]
pub fn record_decryption_completed() {
    DECRYPTIONS_COMPLETED.inc();
}

/// Record a rejected callback with reason
#[cfg(feature = "metrics")]
pub fn record_callback_rejected(reason: &str) {
    CALLBACKS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record a callback for an orphaned request
#[cfg(feature = "metrics")]
pub fn record_stale_callback() {
    STALE_CALLBACKS.inc();
}

/// Record a rejected call
#[cfg(feature = "metrics")]
pub fn record_operation_rejected(operation: &str, category: &str) {
    OPERATIONS_REJECTED
        .with_label_values(&[operation, category])
        .inc();
}

/// Update current batch gauge
#[cfg(feature = "metrics")]
pub fn set_current_batch(batch_id: u64) {
    CURRENT_BATCH.set(batch_id as f64);
}

/// Update pending requests gauge
#[cfg(feature = "metrics")]
pub fn set_pending_requests(count: usize) {
    PENDING_REQUESTS.set(count as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_submission() {}

#[cfg(not(feature = "metrics"))]
pub fn record_aggregation() {}

#[cfg(not(feature = "metrics"))]
pub fn record_decryption_completed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_callback_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_stale_callback() {}

#[cfg(not(feature = "metrics"))]
pub fn record_operation_rejected(_operation: &str, _category: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_current_batch(_batch_id: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_pending_requests(_count: usize) {}
