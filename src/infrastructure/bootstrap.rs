//! Infrastructure bootstrap helpers for service wiring.
//!
//! Every builder takes a validated [`Config`] and returns a ready service.
//! Settings an operation needs but the file left out surface as
//! [`ConfigError::MissingField`](crate::error::ConfigError::MissingField)
//! here, before anything reaches the ledger.

use std::sync::Arc;

use tracing::debug;

use crate::adapter::outbound::evm::ledger::EvmLedger;
use crate::adapter::outbound::evm::signer;
use crate::adapter::outbound::identity::rest::RestDirectory;
use crate::application::activity::ActivityRequestFlow;
use crate::application::asset::AssetCatalog;
use crate::application::executor::TransactionExecutor;
use crate::application::loan::LoanLifecycle;
use crate::application::oracle::PriceOracle;
use crate::application::resolver::EventResolver;
use crate::application::sale::SaleLifecycle;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::identity::IdentityDirectory;
use crate::port::outbound::ledger::Ledger;

/// Connect to the configured RPC endpoint, signing with the configured key
/// when there is one.
pub(crate) fn build_ledger(config: &Config) -> Result<Arc<dyn Ledger>> {
    let signer = config
        .wallet
        .private_key
        .as_deref()
        .map(|key| signer::from_private_key(key, config.network.chain_id))
        .transpose()?;
    debug!(
        rpc_url = %config.network.rpc_url,
        signer = signer.is_some(),
        "Connecting to ledger"
    );
    Ok(Arc::new(EvmLedger::connect(&config.network.rpc_url, signer)?))
}

/// Services over one shared ledger connection.
pub(crate) struct Wiring {
    ledger: Arc<dyn Ledger>,
    executor: Arc<TransactionExecutor>,
    resolver: EventResolver,
}

impl Wiring {
    pub(crate) fn new(config: &Config, ledger: Arc<dyn Ledger>) -> Self {
        let executor = Arc::new(TransactionExecutor::new(
            ledger.clone(),
            config.confirmation.policy(),
        ));
        Self {
            ledger,
            executor,
            resolver: EventResolver::default(),
        }
    }

    pub(crate) fn connect(config: &Config) -> Result<Self> {
        Ok(Self::new(config, build_ledger(config)?))
    }

    pub(crate) fn price_oracle(&self, config: &Config) -> Result<PriceOracle> {
        Ok(PriceOracle::new(
            self.ledger.clone(),
            config.contracts.marketplace()?,
        ))
    }

    pub(crate) fn sales(&self, config: &Config) -> Result<SaleLifecycle> {
        Ok(SaleLifecycle::new(
            self.ledger.clone(),
            self.executor.clone(),
            self.resolver.clone(),
            config.contracts.marketplace()?,
        ))
    }

    pub(crate) fn loans(&self, config: &Config) -> Result<LoanLifecycle> {
        Ok(LoanLifecycle::new(
            self.ledger.clone(),
            self.executor.clone(),
            self.resolver.clone(),
            config.contracts.marketplace()?,
        ))
    }

    pub(crate) fn assets(&self, config: &Config) -> Result<AssetCatalog> {
        Ok(AssetCatalog::new(
            self.ledger.clone(),
            self.executor.clone(),
            config.contracts.marketplace()?,
        ))
    }

    /// The activity flow checks its own settings on every request, so a
    /// partially configured file still builds.
    pub(crate) fn activity(&self, config: &Config) -> ActivityRequestFlow {
        ActivityRequestFlow::new(
            self.ledger.clone(),
            self.executor.clone(),
            self.resolver.clone(),
            config.activity_settings(),
        )
    }

    pub(crate) fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }
}

/// Build the REST identity directory.
pub(crate) fn build_identity(config: &Config) -> Result<Box<dyn IdentityDirectory>> {
    let url = config
        .identity
        .url
        .as_deref()
        .ok_or(ConfigError::MissingField {
            field: "identity.url",
        })?;
    let key = config
        .identity
        .api_key
        .clone()
        .ok_or(ConfigError::MissingField {
            field: "identity.api_key",
        })?;
    Ok(Box::new(RestDirectory::new(url, &config.identity.table, key)?))
}
