//! Diagnostic operator implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::infrastructure::bootstrap::Wiring;
use crate::infrastructure::config;
use crate::port::inbound::operator::diagnostic::{
    ConfigCheckReport, ConnectionReport, DiagnosticOperator,
};

use super::entry::Operator;

#[async_trait]
impl DiagnosticOperator for Operator {
    fn check_config(&self, config_toml: &str) -> Result<ConfigCheckReport> {
        let config = config::settings::Config::parse_toml(config_toml)?;
        let wallet = config
            .wallet
            .private_key
            .as_deref()
            .map(|key| {
                crate::adapter::outbound::evm::signer::from_private_key(
                    key,
                    config.network.chain_id,
                )
            })
            .transpose()?
            .map(|signer| alloy_signer::Signer::address(&signer));
        let activity = &config.activity;

        Ok(ConfigCheckReport {
            rpc_url: config.network.rpc_url.clone(),
            chain_id: config.network.chain_id,
            marketplace: config.contracts.marketplace().ok(),
            activity: config.contracts.activity.filter(|a| !a.is_zero()),
            activity_parameters_set: activity.secrets_slot.is_some()
                && activity.secrets_version.is_some()
                && activity.subscription_id.is_some(),
            wallet,
            identity_url: config.identity.url.clone(),
            identity_key_present: config.identity.api_key.is_some(),
            poll_max_attempts: config.polling.max_attempts,
            poll_delay_ms: config.polling.delay_ms,
            confirmation_timeout_secs: config.confirmation.timeout_secs,
        })
    }

    async fn check_connection(&self, config_toml: &str) -> Result<ConnectionReport> {
        let config = config::settings::Config::parse_toml(config_toml)?;
        let wiring = Wiring::connect(&config)?;
        let ledger = wiring.ledger();

        let block_number = ledger.block_number().await?;
        let block_timestamp = ledger.block_timestamp().await?;
        let price = match wiring.price_oracle(&config) {
            Ok(oracle) => Some(oracle.latest_price().await?),
            Err(_) => None,
        };

        Ok(ConnectionReport {
            rpc_url: config.network.rpc_url,
            block_number,
            block_timestamp,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{config as test_config, fixture};

    #[test]
    fn config_report_reflects_sections() {
        let report = Operator.check_config(&test_config::toml()).unwrap();
        assert_eq!(report.chain_id, Some(31337));
        assert_eq!(report.marketplace, Some(fixture::MARKETPLACE));
        assert_eq!(report.activity, Some(fixture::ACTIVITY));
        assert!(report.activity_parameters_set);
        assert_eq!(report.poll_max_attempts, 20);
        assert_eq!(report.identity_url, None);
    }

    #[test]
    fn incomplete_activity_section_is_reported() {
        let report = Operator
            .check_config("[activity]\nsecrets_slot = 0\n")
            .unwrap();
        assert_eq!(report.marketplace, None);
        assert!(!report.activity_parameters_set);
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(Operator
            .check_config("[polling]\nmax_attempts = 0\n")
            .unwrap_err()
            .is_configuration());
    }
}
