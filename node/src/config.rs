//! Deployment configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use poi_execution::{ReputationStakeAge, SeededPolicy, SelectionPolicy};
use poi_types::{Address, ChainId, ProtocolParams};

use crate::NodeError;

/// How auction winners are picked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionConfig {
    /// Highest reputation, then stake, then earliest registration.
    ReputationStakeAge,
    /// Deterministic pseudo-random pick from a hex-encoded 32-byte seed.
    Seeded { seed: String },
}

impl SelectionConfig {
    pub fn build(&self) -> Result<Box<dyn SelectionPolicy>, NodeError> {
        match self {
            Self::ReputationStakeAge => Ok(Box::new(ReputationStakeAge)),
            Self::Seeded { seed } => {
                let bytes = hex::decode(seed.trim_start_matches("0x"))
                    .map_err(|e| NodeError::Config(format!("selection seed: {e}")))?;
                let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                    NodeError::Config(format!("selection seed must be 32 bytes, got {}", b.len()))
                })?;
                Ok(Box::new(SeededPolicy::new(seed)))
            }
        }
    }
}

/// Configuration for an in-process two-chain deployment.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Chain hosting the POI registry.
    #[serde(default = "default_settlement_chain")]
    pub settlement_chain_id: ChainId,

    /// Chain hosting the validator registry and auction.
    #[serde(default = "default_execution_chain")]
    pub execution_chain_id: ChainId,

    /// Administrator of both chains' contracts.
    #[serde(default = "default_admin")]
    pub admin: Address,

    #[serde(default = "default_registry_address")]
    pub registry_address: Address,

    #[serde(default = "default_validators_address")]
    pub validators_address: Address,

    #[serde(default = "default_auction_address")]
    pub auction_address: Address,

    /// Period of the daemon's relay loop.
    #[serde(default = "default_relay_interval_ms")]
    pub relay_interval_ms: u64,

    /// Deliveries remembered per inbox for redelivery detection.
    #[serde(default = "default_inbox_capacity")]
    pub inbox_capacity: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_selection")]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub params: ProtocolParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_settlement_chain() -> ChainId {
    ChainId::DEV_SETTLEMENT
}

fn default_execution_chain() -> ChainId {
    ChainId::DEV_EXECUTION
}

fn default_admin() -> Address {
    Address::derive("admin")
}

fn default_registry_address() -> Address {
    Address::derive("poi-registry")
}

fn default_validators_address() -> Address {
    Address::derive("validator-registry")
}

fn default_auction_address() -> Address {
    Address::derive("verification-auction")
}

fn default_relay_interval_ms() -> u64 {
    1_000
}

fn default_inbox_capacity() -> usize {
    poi_relay::DEFAULT_INBOX_CAPACITY
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_selection() -> SelectionConfig {
    SelectionConfig::ReputationStakeAge
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.params
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        if self.settlement_chain_id == self.execution_chain_id {
            return Err(NodeError::Config(format!(
                "settlement and execution chains must differ (both {})",
                self.settlement_chain_id
            )));
        }
        let contracts = [self.registry_address, self.validators_address, self.auction_address];
        if contracts.iter().any(Address::is_null) {
            return Err(NodeError::Config("contract addresses must not be null".into()));
        }
        if self.relay_interval_ms == 0 {
            return Err(NodeError::Config("relay_interval_ms must be positive".into()));
        }
        self.selection.build().map(|_| ())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            settlement_chain_id: default_settlement_chain(),
            execution_chain_id: default_execution_chain(),
            admin: default_admin(),
            registry_address: default_registry_address(),
            validators_address: default_validators_address(),
            auction_address: default_auction_address(),
            relay_interval_ms: default_relay_interval_ms(),
            inbox_capacity: default_inbox_capacity(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            selection: default_selection(),
            params: ProtocolParams::default(),
        }
    }
}
