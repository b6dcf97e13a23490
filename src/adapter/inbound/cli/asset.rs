//! Handlers for `asset` subcommands.

use tabled::{Table, Tabled};

use super::command::AssetCommand;
use super::{operator, output};
use crate::application::asset::AssetCatalog;
use crate::domain::id::AssetId;
use crate::error::{ConfigError, Result};

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "Asset")]
    asset_id: String,
}

/// Dispatch an `asset` subcommand.
pub async fn execute(config_toml: &str, command: &AssetCommand) -> Result<()> {
    let assets = operator::operator()?.assets(config_toml)?;
    match command {
        AssetCommand::Mint(args) => mint(&assets, &args.uri).await,
        AssetCommand::Owned(args) => {
            let owner = args
                .address
                .or_else(|| assets.signer())
                .ok_or(ConfigError::MissingField {
                    field: "WALLET_PRIVATE_KEY",
                })?;
            let ids = assets.tokens_of_owner(owner).await?;
            table("asset.owned", &format!("Owned by {owner}"), ids)
        }
        AssetCommand::All => {
            let ids = assets.all_tokens().await?;
            table("asset.all", "All assets", ids)
        }
        AssetCommand::Info(args) => {
            let info = assets.info(args.asset_id).await?;
            if output::is_json() {
                return output::result("asset.info", &info);
            }
            output::section(&format!("Asset {}", info.asset_id));
            output::field("Owner", info.owner);
            output::field("URI", output::highlight(&info.uri));
            Ok(())
        }
        AssetCommand::Contracts => {
            let addresses = assets.contract_addresses().await?;
            if output::is_json() {
                return output::result("asset.contracts", &addresses);
            }
            output::section("Contracts");
            output::field("Collection", addresses.nft);
            output::field("Lending", addresses.lending);
            output::field("Price feed", addresses.price_feed);
            Ok(())
        }
        AssetCommand::Collection => {
            let collection = assets.collection().await?;
            if output::is_json() {
                return output::result("asset.collection", &collection);
            }
            output::section(&collection.name);
            output::field("Symbol", &collection.symbol);
            output::field("Minted", collection.total_minted);
            Ok(())
        }
    }
}

async fn mint(assets: &AssetCatalog, uri: &str) -> Result<()> {
    let outcome = assets.mint(uri).await?;

    if output::is_json() {
        return output::result("asset.mint", &outcome);
    }

    output::section("Minted");
    output::field("Transaction", outcome.receipt.handle());
    output::field("Block", outcome.receipt.block_number());
    match outcome.asset_id {
        Some(id) => output::field("Asset", output::positive(id)),
        None => output::warning("Asset id not reported in receipt"),
    }
    Ok(())
}

fn table(command: &str, title: &str, ids: Vec<AssetId>) -> Result<()> {
    if output::is_json() {
        return output::result(command, &ids);
    }

    output::section(title);
    if ids.is_empty() {
        output::note("No assets");
        return Ok(());
    }
    let rows: Vec<AssetRow> = ids
        .iter()
        .map(|id| AssetRow {
            asset_id: id.to_string(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
