//! Handlers for `price` and `convert`.

use serde_json::json;

use super::command::ConvertArgs;
use super::{operator, output};
use crate::domain::money::{Money, Unit};
use crate::error::Result;

/// Print the current feed price.
pub async fn execute_price(config_toml: &str) -> Result<()> {
    let oracle = operator::operator()?.price_oracle(config_toml)?;
    let rate = oracle.latest_price().await?;

    if output::is_json() {
        return output::result("price", &json!({ "usd_per_native": rate.as_money() }));
    }

    output::section("Price");
    output::field("1 ETH", output::highlight(rate.as_money()));
    Ok(())
}

/// Convert an amount at the current feed price.
pub async fn execute_convert(config_toml: &str, args: &ConvertArgs) -> Result<()> {
    let unit = if args.from_native {
        Unit::Native
    } else {
        Unit::Usd
    };
    let amount = Money::parse(&args.amount, unit)?;

    let oracle = operator::operator()?.price_oracle(config_toml)?;
    let converted = match unit {
        Unit::Native => oracle.native_to_usd(amount).await?,
        Unit::Usd => oracle.usd_to_native(amount).await?,
    };

    if output::is_json() {
        return output::result("convert", &json!({ "from": amount, "to": converted }));
    }

    output::field(&amount.to_string(), output::highlight(converted));
    Ok(())
}
