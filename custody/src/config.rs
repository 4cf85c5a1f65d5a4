use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;

use crate::error::{CustodyError, Result};

/// Sepolia testnet chain id.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Default request timeout for the backend client.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;

/// Default JSON-RPC endpoint of a locally running wallet.
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

/// Configuration for the custody client.
#[derive(Debug, Clone)]
pub struct CustodyConfig {
    /// Base URL of the custody backend (e.g. `https://custody.example.com/api`).
    pub api_base_url: String,
    /// Per-request timeout for backend calls.
    pub api_timeout: Duration,
    /// JSON-RPC URL of the injected wallet.
    pub wallet_rpc_url: String,
    /// Chain the wallet must be connected to.
    pub expected_chain_id: u64,
    /// Omnibus vault contract receiving `depositETH` calls.
    pub omnibus_vault: Address,
    /// Directory holding persisted session and theme state.
    pub state_dir: PathBuf,
    /// How long to wait for a deposit receipt.
    pub receipt_timeout: Duration,
    /// Interval between receipt polls.
    pub receipt_poll_interval: Duration,
    /// Lifetime of a notification before it is dropped.
    pub notification_ttl: Duration,
}

impl CustodyConfig {
    /// Configuration pointing at `api_base_url` with every other field defaulted.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            wallet_rpc_url: DEFAULT_WALLET_RPC_URL.to_string(),
            expected_chain_id: SEPOLIA_CHAIN_ID,
            omnibus_vault: Address::ZERO,
            state_dir: PathBuf::from(".custody"),
            receipt_timeout: Duration::from_secs(180),
            receipt_poll_interval: Duration::from_secs(2),
            notification_ttl: Duration::from_secs(5),
        }
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// `API_BASE_URL` is required; everything else falls back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CustodyError::Config("API_BASE_URL is required".into()))?;
        url::Url::parse(&base_url)
            .map_err(|e| CustodyError::Config(format!("invalid API_BASE_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Some(ms) = lookup("API_TIMEOUT_MS") {
            config.api_timeout = Duration::from_millis(parse_number(&ms, "API_TIMEOUT_MS")?);
        }
        if let Some(url) = lookup("WALLET_RPC_URL") {
            config.wallet_rpc_url = url;
        }
        if let Some(id) = lookup("EXPECTED_CHAIN_ID") {
            config.expected_chain_id = parse_number(&id, "EXPECTED_CHAIN_ID")?;
        }
        if let Some(vault) = lookup("OMNIBUS_VAULT") {
            config.omnibus_vault = vault
                .trim()
                .parse()
                .map_err(|e| CustodyError::Config(format!("invalid OMNIBUS_VAULT: {e}")))?;
        }
        if let Some(dir) = lookup("CUSTODY_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("RECEIPT_TIMEOUT_SECS") {
            config.receipt_timeout =
                Duration::from_secs(parse_number(&secs, "RECEIPT_TIMEOUT_SECS")?);
        }

        Ok(config)
    }
}

fn parse_number(value: &str, key: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| CustodyError::Config(format!("invalid {key}: {e}")))
}
