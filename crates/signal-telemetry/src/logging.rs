//! Structured logging.
//!
//! Logs carry consistent fields so they can be shipped and parsed:
//! - `level`, `target`, `message`
//! - `component`: engine component (access, batch, registry, bridge, verifier)
//! - `batch_id` / `request_id` where relevant

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber. Logs go to stderr; stdout is
/// left to the node's receipts.
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    if !config.console_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        return Ok(());
    }

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(
        service = %config.full_service_name(),
        json_logs = config.json_logs,
        "Structured logging configured"
    );

    Ok(())
}

/// Log an event tagged with the engine component.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an event about a batch with standard fields.
#[macro_export]
macro_rules! log_batch_event {
    ($level:ident, $component:expr, $msg:expr, $batch_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            batch_id = $batch_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an event about an oracle request with standard fields.
#[macro_export]
macro_rules! log_request_event {
    ($level:ident, $component:expr, $msg:expr, $request_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            request_id = $request_id,
            $($($field)*,)?
            $msg
        )
    };
}
