//! Diagnostic projections for operator-facing adapters.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::money::ExchangeRate;
use crate::error::Result;

/// Summary output for `check config`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigCheckReport {
    pub rpc_url: String,
    pub chain_id: Option<u64>,
    pub marketplace: Option<Address>,
    pub activity: Option<Address>,
    /// Slot, version and subscription are all set.
    pub activity_parameters_set: bool,
    /// Address of the configured signer, if any.
    pub wallet: Option<Address>,
    pub identity_url: Option<String>,
    pub identity_key_present: bool,
    pub poll_max_attempts: u32,
    pub poll_delay_ms: u64,
    pub confirmation_timeout_secs: u64,
}

/// Output of `check connection`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub rpc_url: String,
    pub block_number: u64,
    pub block_timestamp: u64,
    /// Feed price, when a marketplace is configured.
    pub price: Option<ExchangeRate>,
}

/// Configuration and connectivity checks.
#[async_trait]
pub trait DiagnosticOperator: Send + Sync {
    /// Parse and validate `config_toml` without touching the network.
    fn check_config(&self, config_toml: &str) -> Result<ConfigCheckReport>;

    /// Reach the ledger and, if configured, the price feed.
    async fn check_connection(&self, config_toml: &str) -> Result<ConnectionReport>;
}
