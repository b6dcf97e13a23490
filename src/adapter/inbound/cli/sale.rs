//! Handlers for `sale` subcommands.

use tabled::{Table, Tabled};

use super::command::{AssetArg, SaleCommand, SaleCreateArgs};
use super::{operator, output, receipt};
use crate::application::sale::SaleLifecycle;
use crate::domain::event::EventKind;
use crate::domain::money::Money;
use crate::domain::sale::SaleListing;
use crate::error::Result;

#[derive(Tabled)]
struct SaleRow {
    #[tabled(rename = "Asset")]
    asset_id: String,
    #[tabled(rename = "Seller")]
    seller: String,
    #[tabled(rename = "Price (USD)")]
    price_usd: String,
    #[tabled(rename = "Price (ETH)")]
    price_native: String,
}

impl From<&SaleListing> for SaleRow {
    fn from(listing: &SaleListing) -> Self {
        Self {
            asset_id: listing.sale.asset_id.to_string(),
            seller: listing.sale.seller.to_string(),
            price_usd: listing.sale.price_usd.amount_string(),
            price_native: listing.price_native.amount_string(),
        }
    }
}

/// Dispatch a `sale` subcommand.
pub async fn execute(config_toml: &str, command: &SaleCommand) -> Result<()> {
    let sales = operator::operator()?.sales(config_toml)?;
    match command {
        SaleCommand::List => list(&sales).await,
        SaleCommand::Info(args) => info(&sales, args).await,
        SaleCommand::Quote(args) => quote(&sales, args).await,
        SaleCommand::Create(args) => create(&sales, args).await,
        SaleCommand::Buy(args) => {
            let outcome = sales.purchase(args.asset_id).await?;
            receipt::report(
                "sale.buy",
                "Purchased",
                &outcome,
                &outcome.receipt,
                outcome.event.as_ref(),
                EventKind::NftPurchased,
            )
        }
        SaleCommand::Cancel(args) => {
            let outcome = sales.cancel(args.asset_id).await?;
            receipt::report(
                "sale.cancel",
                "Sale cancelled",
                &outcome,
                &outcome.receipt,
                outcome.event.as_ref(),
                EventKind::SaleCancelled,
            )
        }
    }
}

async fn list(sales: &SaleLifecycle) -> Result<()> {
    let listings = sales.active_sales().await?;

    if output::is_json() {
        return output::result("sale.list", &listings);
    }

    output::section("Active sales");
    if listings.is_empty() {
        output::note("No assets are for sale");
        return Ok(());
    }
    let rows: Vec<SaleRow> = listings.iter().map(SaleRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

async fn info(sales: &SaleLifecycle, args: &AssetArg) -> Result<()> {
    let sale = sales.sale_info(args.asset_id).await?;

    if output::is_json() {
        return output::result("sale.info", &sale);
    }

    output::section(&format!("Sale of asset {}", args.asset_id));
    match sale {
        Some(sale) => {
            output::field("Seller", sale.seller);
            output::field("Price", output::highlight(sale.price_usd));
        }
        None => output::note("Not for sale"),
    }
    Ok(())
}

async fn quote(sales: &SaleLifecycle, args: &AssetArg) -> Result<()> {
    let quote = sales.sale_quote(args.asset_id).await?;

    if output::is_json() {
        return output::result("sale.quote", &quote);
    }

    output::section(&format!("Quote for asset {}", args.asset_id));
    output::field("Price", quote.usd);
    output::field("Pay", output::highlight(quote.native));
    output::note("The native amount is re-read when the purchase is submitted");
    Ok(())
}

async fn create(sales: &SaleLifecycle, args: &SaleCreateArgs) -> Result<()> {
    let price = Money::parse_price_usd(&args.price_usd)?;
    let outcome = sales.create(args.asset_id, price).await?;
    receipt::report(
        "sale.create",
        "Listed for sale",
        &outcome,
        &outcome.receipt,
        outcome.event.as_ref(),
        EventKind::SaleCreated,
    )
}
