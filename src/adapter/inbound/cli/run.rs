//! Command dispatch.

use super::command::{Cli, Commands};
use super::{activity, asset, check, identity, loan, operator, price, sale};
use crate::error::Result;

/// Run the parsed command against the configuration file it names.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config_toml = operator::read_config_toml(&cli.config)?;

    match &cli.command {
        Commands::Price => price::execute_price(&config_toml).await,
        Commands::Convert(args) => price::execute_convert(&config_toml, args).await,
        Commands::Sale(command) => sale::execute(&config_toml, command).await,
        Commands::Loan(command) => loan::execute(&config_toml, command).await,
        Commands::Activity(command) => activity::execute(&config_toml, command).await,
        Commands::Asset(command) => asset::execute(&config_toml, command).await,
        Commands::Identity(command) => identity::execute(&config_toml, command).await,
        Commands::Check(command) => check::execute(&cli.config, &config_toml, command).await,
    }
}
