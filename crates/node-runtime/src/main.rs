//! # Cipher-Signal Node
//!
//! Entry point for a Cipher-Signal node.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (from env)
//! 2. Load configuration (defaults, `CS_CONFIG` file, env)
//! 3. Build the engine, oracle and event bus
//! 4. Start the decryptor, relay and event logger tasks
//! 5. Apply JSON lines from stdin, writing one JSON response per line
//!
//! ## Input
//!
//! ```text
//! {"sender":"0x01..","timestamp":0,"call":{"op":"open_batch"}}
//! {"node":"encrypt","value":42}
//! {"node":"status"}
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use signal_telemetry::{init_telemetry, TelemetryConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// Time allowed for outstanding decryptions after stdin closes.
const ORACLE_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = NodeConfig::load().context("Failed to load configuration")?;
    if config.uses_dev_owner() {
        warn!("Using development owner; set CS_OWNER for anything but local testing");
    }

    let mut node = NodeRuntime::new(config)?;
    node.start()?;

    info!("Node is running. Reading transactions from stdin, Ctrl+C to stop.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("Input closed");
                    if !node.wait_for_oracle(ORACLE_DRAIN_TIMEOUT).await {
                        warn!("Decryption requests still outstanding at exit");
                    }
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let response = node.handle_line(&line).await?;
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received");
                break;
            }
        }
    }

    node.shutdown().await;
    Ok(())
}
