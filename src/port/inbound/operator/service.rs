//! Application services handed to inbound adapters.
//!
//! Each accessor parses the configuration and wires a fresh service over a
//! new ledger connection. Missing settings fail here, before any submission.

use crate::application::activity::ActivityRequestFlow;
use crate::application::asset::AssetCatalog;
use crate::application::loan::LoanLifecycle;
use crate::application::oracle::PriceOracle;
use crate::application::sale::SaleLifecycle;
use crate::error::Result;
use crate::port::outbound::identity::IdentityDirectory;

/// Service construction for operator-facing adapters.
pub trait ServiceOperator: Send + Sync {
    fn price_oracle(&self, config_toml: &str) -> Result<PriceOracle>;

    fn sales(&self, config_toml: &str) -> Result<SaleLifecycle>;

    fn loans(&self, config_toml: &str) -> Result<LoanLifecycle>;

    fn assets(&self, config_toml: &str) -> Result<AssetCatalog>;

    fn activity(&self, config_toml: &str) -> Result<ActivityRequestFlow>;

    fn identity(&self, config_toml: &str) -> Result<Box<dyn IdentityDirectory>>;
}
