//! Handlers for `check` subcommands.

use std::path::Path;

use super::command::CheckCommand;
use super::{operator, output, receipt};
use crate::error::Result;

/// Dispatch a `check` subcommand.
pub async fn execute(path: &Path, config_toml: &str, command: &CheckCommand) -> Result<()> {
    match command {
        CheckCommand::Config => execute_config(path, config_toml),
        CheckCommand::Connection => execute_connection(config_toml).await,
    }
}

/// Validate the configuration file without touching the ledger.
fn execute_config(path: &Path, config_toml: &str) -> Result<()> {
    let report = operator::operator()?.check_config(config_toml)?;

    if output::is_json() {
        return output::result("check.config", &report);
    }

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("RPC", &report.rpc_url);
    match report.chain_id {
        Some(chain_id) => output::field("Chain ID", chain_id),
        None => output::field("Chain ID", output::muted("from node")),
    }
    match report.marketplace {
        Some(marketplace) => output::field("Marketplace", marketplace),
        None => output::warning("contracts.marketplace not set (sale, loan and asset commands need it)"),
    }
    match report.activity {
        Some(activity) if report.activity_parameters_set => output::field("Activity", activity),
        Some(_) => output::warning("Activity contract set but [activity] parameters are incomplete"),
        None => output::field("Activity", output::muted("disabled")),
    }
    output::field(
        "Polling",
        format!(
            "{} attempts, {}ms apart",
            report.poll_max_attempts, report.poll_delay_ms
        ),
    );
    output::field(
        "Confirmation",
        format!("{}s timeout", report.confirmation_timeout_secs),
    );

    match report.wallet {
        Some(wallet) => output::success(&format!("Signing as {wallet}")),
        None => output::warning(
            "Wallet not configured (set WALLET_PRIVATE_KEY or wallet.keystore_path)",
        ),
    }
    match (&report.identity_url, report.identity_key_present) {
        (Some(_), true) => output::success("Identity directory configured"),
        (Some(_), false) => output::warning("Identity directory URL set but API key is missing"),
        (None, _) => output::field("Identity", output::muted("disabled")),
    }

    output::success("Configuration check complete");
    Ok(())
}

/// Reach the RPC endpoint and, when configured, the price feed.
async fn execute_connection(config_toml: &str) -> Result<()> {
    let report = operator::operator()?.check_connection(config_toml).await?;

    if output::is_json() {
        return output::result("check.connection", &report);
    }

    output::section("Connection Check");
    output::field("RPC", &report.rpc_url);
    output::field("Block", report.block_number);
    output::field("Ledger time", receipt::timestamp(report.block_timestamp));
    match report.price {
        Some(price) => output::field("Price", price),
        None => output::note("Price feed not checked (contracts.marketplace not set)"),
    }
    output::success("Connection OK");
    Ok(())
}
