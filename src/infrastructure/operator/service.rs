//! Service operator implementation.

use crate::application::activity::ActivityRequestFlow;
use crate::application::asset::AssetCatalog;
use crate::application::loan::LoanLifecycle;
use crate::application::oracle::PriceOracle;
use crate::application::sale::SaleLifecycle;
use crate::error::Result;
use crate::infrastructure::bootstrap::{self, Wiring};
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::service::ServiceOperator;
use crate::port::outbound::identity::IdentityDirectory;

use super::entry::Operator;

impl ServiceOperator for Operator {
    fn price_oracle(&self, config_toml: &str) -> Result<PriceOracle> {
        let config = Config::parse_toml(config_toml)?;
        config.contracts.marketplace()?;
        Wiring::connect(&config)?.price_oracle(&config)
    }

    fn sales(&self, config_toml: &str) -> Result<SaleLifecycle> {
        let config = Config::parse_toml(config_toml)?;
        config.contracts.marketplace()?;
        Wiring::connect(&config)?.sales(&config)
    }

    fn loans(&self, config_toml: &str) -> Result<LoanLifecycle> {
        let config = Config::parse_toml(config_toml)?;
        config.contracts.marketplace()?;
        Wiring::connect(&config)?.loans(&config)
    }

    fn assets(&self, config_toml: &str) -> Result<AssetCatalog> {
        let config = Config::parse_toml(config_toml)?;
        config.contracts.marketplace()?;
        Wiring::connect(&config)?.assets(&config)
    }

    fn activity(&self, config_toml: &str) -> Result<ActivityRequestFlow> {
        let config = Config::parse_toml(config_toml)?;
        Ok(Wiring::connect(&config)?.activity(&config))
    }

    fn identity(&self, config_toml: &str) -> Result<Box<dyn IdentityDirectory>> {
        let config = Config::parse_toml(config_toml)?;
        bootstrap::build_identity(&config)
    }
}
