//! Prometheus metrics for the Cipher-Signal node.
//!
//! All metrics follow the naming convention: `cs_<area>_<metric>_<unit>`.
//! Engine-level counters live in the engine crate (behind its `metrics`
//! feature) and are registered on the default Prometheus registry;
//! [`encode_metrics`] renders both registries.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Node metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Transactions applied to the engine, by outcome
    pub static ref TRANSACTIONS_APPLIED: CounterVec = CounterVec::new(
        Opts::new("cs_node_transactions_total", "Transactions applied to the engine"),
        &["outcome"]  // ok, or the error category
    ).expect("metric creation failed");

    /// Oracle callbacks relayed to the engine
    pub static ref CALLBACKS_RELAYED: Counter = Counter::new(
        "cs_node_callbacks_relayed_total",
        "Oracle callbacks relayed to the engine"
    ).expect("metric creation failed");

    /// Oracle callbacks the engine rejected
    pub static ref CALLBACKS_REJECTED: Counter = Counter::new(
        "cs_node_callbacks_rejected_total",
        "Oracle callbacks rejected by the engine"
    ).expect("metric creation failed");

    /// Decryption requests handed to the oracle and not yet answered
    pub static ref ORACLE_BACKLOG: Gauge = Gauge::new(
        "cs_node_oracle_backlog",
        "Decryption requests awaiting an oracle callback"
    ).expect("metric creation failed");
}

/// Register all node metrics with [`REGISTRY`].
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TRANSACTIONS_APPLIED.clone()),
        Box::new(CALLBACKS_RELAYED.clone()),
        Box::new(CALLBACKS_REJECTED.clone()),
        Box::new(ORACLE_BACKLOG.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Render node and engine metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut metric_families = REGISTRY.gather();
    metric_families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
