//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `WALLET_PRIVATE_KEY`.
//!
//! # Example
//!
//! ```no_run
//! use nftlend::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;

use super::logging::LoggingConfig;
use super::wallet::WalletConfig;
use crate::application::activity::ActivityRequestSettings;
use crate::application::executor::ConfirmationPolicy;
use crate::application::polling::PollPlan;
use crate::error::{ConfigError, Result};

/// Ledger connection.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Chain id used when signing. Queried from the node when unset.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: None,
        }
    }
}

/// Deployed contract addresses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsConfig {
    /// Marketplace contract: collection, sales, loans, price feed.
    #[serde(default)]
    pub marketplace: Option<Address>,
    /// Activity request contract.
    #[serde(default)]
    pub activity: Option<Address>,
}

impl ContractsConfig {
    /// The marketplace address. Unset and zero are both missing.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingField`] naming `contracts.marketplace`.
    pub fn marketplace(&self) -> Result<Address> {
        self.marketplace.filter(|a| !a.is_zero()).ok_or_else(|| {
            ConfigError::MissingField {
                field: "contracts.marketplace",
            }
            .into()
        })
    }
}

/// Parameters forwarded with every activity request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityConfig {
    #[serde(default)]
    pub secrets_slot: Option<u8>,
    #[serde(default)]
    pub secrets_version: Option<u64>,
    #[serde(default)]
    pub subscription_id: Option<u64>,
}

/// How long to look for an event that is published after inclusion.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,
}

const fn default_max_attempts() -> u32 {
    20
}

const fn default_delay_ms() -> u64 {
    5_000
}

const fn default_lookback_blocks() -> u64 {
    100
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            lookback_blocks: default_lookback_blocks(),
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub fn plan(&self) -> PollPlan {
        PollPlan {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
            lookback: self.lookback_blocks,
        }
    }
}

/// How long to wait for a submitted transaction to be included.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ConfirmationConfig {
    #[must_use]
    pub fn policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// Off-ledger handle to wallet directory.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the REST directory. Identity commands are unavailable
    /// without it.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_identity_table")]
    pub table: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_identity_key_env")]
    pub api_key_env: String,
    /// Loaded from `api_key_env` at runtime (never from config file).
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_identity_table() -> String {
    "user_wallets".to_string()
}

fn default_identity_key_env() -> String {
    "IDENTITY_API_KEY".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: None,
            table: default_identity_table(),
            api_key_env: default_identity_key_env(),
            api_key: None,
        }
    }
}

/// Main application configuration.
///
/// Aggregates all configuration settings for the application. Load from a TOML
/// file using [`Config::load`] or parse directly with [`Config::parse_toml`].
/// Every section is optional; missing contract addresses only fail the
/// commands that need them.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Activity request parameters.
    #[serde(default)]
    pub activity: ActivityConfig,

    /// Event polling after inclusion.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Inclusion wait.
    #[serde(default)]
    pub confirmation: ConfirmationConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Wallet configuration for transaction signing.
    ///
    /// Private key is loaded from `WALLET_PRIVATE_KEY` environment variable.
    #[serde(default)]
    pub wallet: WalletConfig,
}

fn read_keystore_password() -> Result<String> {
    if let Ok(password) = std::env::var("NFTLEND_KEYSTORE_PASSWORD") {
        return Ok(password);
    }
    if let Ok(path) = std::env::var("NFTLEND_KEYSTORE_PASSWORD_FILE") {
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let password = contents.trim().to_string();
        if password.is_empty() {
            return Err(ConfigError::MissingField {
                field: "NFTLEND_KEYSTORE_PASSWORD_FILE",
            }
            .into());
        }
        return Ok(password);
    }

    Err(ConfigError::MissingField {
        field: "NFTLEND_KEYSTORE_PASSWORD",
    }
    .into())
}

fn decrypt_keystore_private_key(path: &str, password: &str) -> Result<String> {
    use alloy_signer_local::PrivateKeySigner;

    let signer = PrivateKeySigner::decrypt_keystore(path, password).map_err(|e| {
        ConfigError::InvalidValue {
            field: "keystore_path",
            reason: e.to_string(),
        }
    })?;
    Ok(format!("{:x}", signer.to_bytes()))
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the private key from the `WALLET_PRIVATE_KEY` environment variable
    /// or decrypts it from a keystore file if `keystore_path` is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., a zero confirmation timeout)
    /// - Keystore decryption fails when using keystore authentication
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Secrets come from the environment, never from the file
        config.wallet.private_key = std::env::var("WALLET_PRIVATE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        if config.wallet.private_key.is_none() {
            if let Some(ref keystore_path) = config.wallet.keystore_path {
                let password = read_keystore_password()?;
                config.wallet.private_key =
                    Some(decrypt_keystore_private_key(keystore_path, &password)?);
            }
        }
        config.identity.api_key = std::env::var(&config.identity.api_key_env).ok();

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Contract addresses and activity parameters are not checked here; the
    /// operations that need them report what is missing.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "network.rpc_url",
            }
            .into());
        }
        url::Url::parse(&self.network.rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "network.rpc_url",
            reason: e.to_string(),
        })?;
        if self.network.chain_id == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "network.chain_id",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.polling.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "polling.max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.confirmation.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation.timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.confirmation.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation.poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.confirmation.poll_interval_ms > self.confirmation.timeout_secs * 1_000 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation.poll_interval_ms",
                reason: "must not exceed timeout_secs".to_string(),
            }
            .into());
        }

        if let Some(ref url) = self.identity.url {
            url::Url::parse(url).map_err(|e| ConfigError::InvalidValue {
                field: "identity.url",
                reason: e.to_string(),
            })?;
            if self.identity.table.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "identity.table",
                }
                .into());
            }
        }

        Ok(())
    }

    /// Activity request settings assembled from `[contracts]`, `[activity]`
    /// and `[polling]`.
    #[must_use]
    pub fn activity_settings(&self) -> ActivityRequestSettings {
        ActivityRequestSettings {
            contract: self.contracts.activity,
            secrets_slot: self.activity.secrets_slot,
            secrets_version: self.activity.secrets_version,
            subscription_id: self.activity.subscription_id,
            poll: self.polling.plan(),
        }
    }
}
