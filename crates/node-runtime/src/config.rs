//! # Node Configuration
//!
//! Resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. JSON file named by `CS_CONFIG`
//! 3. Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CS_OWNER` | initial owner address |
//! | `CS_CONTRACT_ID` | engine instance identity |
//! | `CS_COOLDOWN_SECS` | initial cooldown |
//! | `CS_ORACLE_DELAY_MS` | decryptor answer delay |
//! | `CS_ORACLE_KEY` | 32-byte hex proof key |
//!
//! ## Security Requirements
//!
//! - The development owner MUST NOT be used outside development
//! - Without `CS_ORACLE_KEY` a fresh proof key is generated at startup

use serde::Deserialize;
use shared_types::{format_address, parse_address, Address};
use signal_aggregation::{AggregationConfig, SignalError};
use std::path::Path;
use thiserror::Error;

/// Owner used when none is configured.
pub const DEV_OWNER: Address = [0x01; 20];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// File path
        path: String,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`NodeConfigFile`].
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// File path
        path: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// A field could not be parsed.
    #[error("Invalid {field}: {message}")]
    Invalid {
        /// Field or variable name
        field: &'static str,
        /// Parser message
        message: String,
    },

    /// Engine settings rejected.
    #[error("Invalid engine config: {0}")]
    Engine(#[from] SignalError),
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Initial owner of the engine.
    pub owner: Address,
    /// Engine configuration.
    pub aggregation: AggregationConfig,
    /// Oracle configuration.
    pub oracle: OracleConfig,
}

/// Decryption oracle configuration.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Delay before the decryptor answers a request (milliseconds).
    pub delay_ms: u64,
    /// Shared proof key. Generated at startup when absent.
    pub proof_key: Option<[u8; 32]>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            delay_ms: 250,
            proof_key: None,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: DEV_OWNER,
            aggregation: AggregationConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfigFile {
    /// Owner address (hex)
    pub owner: Option<String>,
    /// Engine identity (hex)
    pub contract_identity: Option<String>,
    /// Cooldown (seconds)
    pub cooldown_secs: Option<u64>,
    /// Decryptor delay (milliseconds)
    pub oracle_delay_ms: Option<u64>,
    /// Proof key (hex)
    pub oracle_key: Option<String>,
}

impl NodeConfig {
    /// Load defaults, then `CS_CONFIG`, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("CS_CONFIG") {
            config.apply_file(read_config_file(Path::new(&path))?)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Apply values present in `file`.
    pub fn apply_file(&mut self, file: NodeConfigFile) -> Result<(), ConfigError> {
        if let Some(owner) = file.owner {
            self.owner = parse_field("owner", &owner)?;
        }
        if let Some(identity) = file.contract_identity {
            self.aggregation.contract_identity = parse_field("contract_identity", &identity)?;
        }
        if let Some(cooldown) = file.cooldown_secs {
            self.aggregation.cooldown_secs = cooldown;
        }
        if let Some(delay) = file.oracle_delay_ms {
            self.oracle.delay_ms = delay;
        }
        if let Some(key) = file.oracle_key {
            self.oracle.proof_key = Some(parse_key("oracle_key", &key)?);
        }
        Ok(())
    }

    /// Apply `CS_*` overrides found through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(owner) = lookup("CS_OWNER") {
            self.owner = parse_field("CS_OWNER", &owner)?;
        }
        if let Some(identity) = lookup("CS_CONTRACT_ID") {
            self.aggregation.contract_identity = parse_field("CS_CONTRACT_ID", &identity)?;
        }
        if let Some(cooldown) = lookup("CS_COOLDOWN_SECS") {
            self.aggregation.cooldown_secs = parse_number("CS_COOLDOWN_SECS", &cooldown)?;
        }
        if let Some(delay) = lookup("CS_ORACLE_DELAY_MS") {
            self.oracle.delay_ms = parse_number("CS_ORACLE_DELAY_MS", &delay)?;
        }
        if let Some(key) = lookup("CS_ORACLE_KEY") {
            self.oracle.proof_key = Some(parse_key("CS_ORACLE_KEY", &key)?);
        }
        Ok(())
    }

    /// Validate engine settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregation.validate()?;
        if self.owner == [0u8; 20] {
            return Err(ConfigError::Invalid {
                field: "owner",
                message: "zero address".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the development owner is still in place.
    pub fn uses_dev_owner(&self) -> bool {
        self.owner == DEV_OWNER
    }

    /// One-line summary for startup logs.
    pub fn summary(&self) -> String {
        format!(
            "owner={} identity={} cooldown={}s oracle_delay={}ms",
            format_address(&self.owner),
            format_address(&self.aggregation.contract_identity),
            self.aggregation.cooldown_secs,
            self.oracle.delay_ms
        )
    }
}

fn read_config_file(path: &Path) -> Result<NodeConfigFile, ConfigError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

fn parse_field(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    parse_address(value).map_err(|e| ConfigError::Invalid {
        field,
        message: e.to_string(),
    })
}

fn parse_number(field: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        message: format!("expected an integer, got {:?}", value),
    })
}

fn parse_key(field: &'static str, value: &str) -> Result<[u8; 32], ConfigError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).map_err(|e| ConfigError::Invalid {
        field,
        message: e.to_string(),
    })?;
    bytes.try_into().map_err(|_| ConfigError::Invalid {
        field,
        message: "must be 32 bytes (64 hex chars)".to_string(),
    })
}
