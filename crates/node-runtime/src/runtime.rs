//! # Node Runtime
//!
//! Wires the engine to its collaborators and owns the background tasks.
//!
//! ```text
//! stdin ──tx──→ TransactionHandler ──→ Engine ──events──→ Event Bus ──→ logger
//!                                        │  ↑
//!                         request_decryption │ decryption_callback
//!                                        ↓  │
//!                              ChannelOracle  CallbackRelay
//!                                        │  ↑
//!                                        ↓  │
//!                                     DevDecryptor
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared_bus::{EventFilter, InMemoryEventBus};
use shared_types::format_address;
use signal_aggregation::{
    CallOutcome, ChannelDecryptionOracle, DecryptionJob, InMemoryConfidentialRuntime, ProofKey,
    SignalAggregationApi, SignalAggregationService, TransactionHandler,
};
use signal_telemetry::{encode_metrics, log_event, TRANSACTIONS_APPLIED};
use tokio::sync::{mpsc, watch};
use tokio_stream::StreamExt;
use tracing::{error, info};

use crate::config::NodeConfig;
use crate::decryptor::DevDecryptor;
use crate::relay::CallbackRelay;

/// Engine type run by the node.
pub type Engine = SignalAggregationService<InMemoryConfidentialRuntime, ChannelDecryptionOracle>;

/// Node-local commands, answered without touching the engine's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeCommand {
    /// Encrypt a value with the development runtime.
    Encrypt {
        /// Plaintext value
        value: u64,
    },
    /// Report engine state.
    Status,
    /// Render Prometheus metrics.
    Metrics,
}

/// Responses to [`NodeCommand`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeResponse {
    /// Fresh ciphertext handle.
    Encrypted {
        /// Hex handle
        ciphertext: String,
    },
    /// Engine state snapshot.
    Status {
        /// Owner address
        owner: String,
        /// Pause flag
        paused: bool,
        /// Current batch id
        batch_id: u64,
        /// Whether the batch is open
        batch_open: bool,
        /// Authorized providers
        providers: usize,
        /// Cooldown (seconds)
        cooldown_secs: u64,
        /// Requests awaiting a verified callback
        pending_requests: Vec<u64>,
        /// Pending requests that can no longer verify
        stale_requests: Vec<u64>,
    },
    /// Prometheus text exposition.
    Metrics {
        /// Encoded metrics
        text: String,
    },
}

struct PendingTasks {
    decryptor: DevDecryptor,
    jobs: mpsc::UnboundedReceiver<DecryptionJob>,
}

/// The node runtime.
pub struct NodeRuntime {
    config: NodeConfig,
    engine: Arc<Engine>,
    runtime: Arc<InMemoryConfidentialRuntime>,
    bus: Arc<InMemoryEventBus>,
    handler: TransactionHandler<Engine>,
    pending: Option<PendingTasks>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Build the engine and its collaborators. Nothing runs until [`start`](Self::start).
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating Cipher-Signal node runtime: {}", config.summary());

        let key = match config.oracle.proof_key {
            Some(bytes) => ProofKey::new(bytes),
            None => ProofKey::generate(),
        };
        let runtime = Arc::new(InMemoryConfidentialRuntime::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let (oracle, jobs) = ChannelDecryptionOracle::new(key.clone());

        let engine = Arc::new(
            SignalAggregationService::new(
                config.aggregation.clone(),
                config.owner,
                Arc::clone(&runtime),
                Arc::new(oracle),
                bus.clone(),
            )
            .context("Failed to create aggregation engine")?,
        );

        let decryptor = DevDecryptor::new(
            Arc::clone(&runtime),
            key,
            Duration::from_millis(config.oracle.delay_ms),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            handler: TransactionHandler::new(Arc::clone(&engine)),
            config,
            engine,
            runtime,
            bus,
            pending: Some(PendingTasks { decryptor, jobs }),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Spawn the decryptor, the callback relay and the event logger.
    pub fn start(&mut self) -> Result<()> {
        let PendingTasks { decryptor, jobs } = self
            .pending
            .take()
            .context("Node runtime already started")?;

        info!("===========================================");
        info!("  Cipher-Signal Node v{}", env!("CARGO_PKG_VERSION"));
        info!("  Owner: {}", format_address(&self.config.owner));
        info!("===========================================");

        let (callback_tx, callback_rx) = mpsc::unbounded_channel();

        // Decryptor: jobs -> signed callbacks
        let mut decryptor_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = decryptor.run(jobs, callback_tx) => {}
                _ = decryptor_shutdown.changed() => {
                    info!("[decryptor] Shutdown signal received");
                }
            }
        });

        // Relay: callbacks -> engine
        let relay = CallbackRelay::new(Arc::clone(&self.engine));
        let mut relay_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = relay.run(callback_rx) => {}
                _ = relay_shutdown.changed() => {
                    info!("[relay] Shutdown signal received");
                }
            }
        });

        // Event logger
        let mut events = self.bus.event_stream(EventFilter::all());
        let mut logger_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.next() => match event {
                        Some(event) => {
                            log_event!(info, "bus", "Engine event", topic = ?event.topic(), event = ?event);
                        }
                        None => break,
                    },
                    _ = logger_shutdown.changed() => break,
                }
            }
        });

        info!("Node tasks started");
        Ok(())
    }

    /// Handle one input line: a [`NodeCommand`] or an engine transaction.
    /// Returns the JSON response.
    pub async fn handle_line(&self, line: &str) -> Result<String> {
        if let Ok(command) = serde_json::from_str::<NodeCommand>(line) {
            let response = self.handle_command(command)?;
            return serde_json::to_string(&response).context("Failed to encode response");
        }

        let receipt = self.handler.handle_json(line).await;
        let label = match &receipt.outcome {
            CallOutcome::Rejected { category, .. } => category.as_str(),
            CallOutcome::Malformed { .. } => "malformed",
            _ => "ok",
        };
        TRANSACTIONS_APPLIED.with_label_values(&[label]).inc();
        serde_json::to_string(&receipt).context("Failed to encode receipt")
    }

    /// Answer a node-local command.
    pub fn handle_command(&self, command: NodeCommand) -> Result<NodeResponse> {
        let response = match command {
            NodeCommand::Encrypt { value } => NodeResponse::Encrypted {
                ciphertext: self.runtime.encrypt(value).to_string(),
            },
            NodeCommand::Status => {
                let pending = self.engine.pending_requests();
                let stale = pending
                    .iter()
                    .copied()
                    .filter(|id| self.engine.is_stale(*id))
                    .collect();
                NodeResponse::Status {
                    owner: format_address(&self.engine.owner()),
                    paused: self.engine.is_paused(),
                    batch_id: self.engine.current_batch(),
                    batch_open: self.engine.is_batch_open(),
                    providers: self.engine.providers().len(),
                    cooldown_secs: self.engine.cooldown_secs(),
                    pending_requests: pending,
                    stale_requests: stale,
                }
            }
            NodeCommand::Metrics => NodeResponse::Metrics {
                text: encode_metrics().context("Failed to encode metrics")?,
            },
        };
        Ok(response)
    }

    /// Wait until every pending request is either answered or stale.
    /// Returns `false` on timeout.
    pub async fn wait_for_oracle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let outstanding = self
                .engine
                .pending_requests()
                .into_iter()
                .filter(|id| !self.engine.is_stale(*id))
                .count();
            if outstanding == 0 {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    /// Signal all tasks to stop.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        // Give tasks time to observe the signal
        tokio::time::sleep(Duration::from_millis(100)).await;

        info!("Shutdown complete");
    }

    /// The engine.
    pub fn engine(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }

    /// The event bus.
    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// The development runtime.
    pub fn runtime(&self) -> Arc<InMemoryConfidentialRuntime> {
        Arc::clone(&self.runtime)
    }
}
