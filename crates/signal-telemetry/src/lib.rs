//! # Signal Telemetry
//!
//! Logging and metrics for the Cipher-Signal node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signal_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `cipher-signal` | Service name in logs |
//! | `CS_LOG_LEVEL` | `info` | Log level filter |
//! | `CS_JSON_LOGS` | `false` | JSON log lines |
//! | `CS_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `CS_NETWORK` | `devnet` | Network label |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, CALLBACKS_REJECTED, CALLBACKS_RELAYED, ORACLE_BACKLOG,
    TRANSACTIONS_APPLIED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid filter or other configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics and structured logging.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.full_service_name(),
        "Telemetry initialized"
    );
    Ok(())
}
