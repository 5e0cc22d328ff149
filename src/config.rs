//! Configuration for the batch sender

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;

use crate::error::ConfigError;

/// Batch sender configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Chain RPC URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Ping contract address on the target chain
    pub ping_contract_address: String,

    /// Private key for submitting transactions
    pub private_key: String,

    /// Payment attached to every call, decimal string in the chain's major unit
    #[serde(default = "default_value_per_call")]
    pub value_per_call: String,

    /// HTTP server port (trigger, status, health, metrics)
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Expected chain ID (0 = disable check)
    #[serde(default)]
    pub expected_chain_id: u64,

    /// Submit one batch immediately on startup
    #[serde(default)]
    pub run_on_start: bool,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_value_per_call() -> String {
    "0".to_string()
}

fn default_server_port() -> u16 {
    9090
}

impl BatchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_url: std::env::var("RPC_URL").unwrap_or_else(|_| default_rpc_url()),
            ping_contract_address: std::env::var("PING_CONTRACT_ADDRESS")
                .map_err(|_| ConfigError::MissingEnvVar("PING_CONTRACT_ADDRESS".into()))?,
            private_key: std::env::var("PRIVATE_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("PRIVATE_KEY".into()))?,
            value_per_call: std::env::var("VALUE_PER_CALL")
                .unwrap_or_else(|_| default_value_per_call()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_server_port),
            expected_chain_id: std::env::var("EXPECTED_CHAIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            run_on_start: std::env::var("RUN_ON_START")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Parse and validate the contract address.
    ///
    /// The zero address doubles as the "not yet deployed" placeholder and is
    /// rejected, so a run can never target it.
    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        let raw = self.ping_contract_address.trim();
        if raw.is_empty() {
            return Err(ConfigError::PlaceholderAddress);
        }
        let address: Address = raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(raw.to_string()))?;
        if address == Address::ZERO {
            return Err(ConfigError::PlaceholderAddress);
        }
        Ok(address)
    }

    /// Parse the signing key
    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        self.private_key
            .parse()
            .map_err(|_| ConfigError::InvalidPrivateKey)
    }
}
