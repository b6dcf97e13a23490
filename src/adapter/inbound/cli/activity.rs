//! Handlers for `activity` subcommands.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::ActivityCommand;
use super::{operator, output};
use crate::domain::activity::ActivityResult;
use crate::error::Result;

#[derive(Tabled)]
struct PointsRow {
    #[tabled(rename = "Wallet")]
    wallet: String,
    #[tabled(rename = "Points")]
    points: String,
}

/// Dispatch an `activity` subcommand.
pub async fn execute(config_toml: &str, command: &ActivityCommand) -> Result<()> {
    match command {
        ActivityCommand::Request(args) => {
            let flow = operator::operator()?.activity(config_toml)?;
            if !output::is_json() && !output::is_quiet() {
                output::note("Waiting for the activity result, this can take a while");
            }
            let result = flow.request(&args.handle).await?;
            report(&result)
        }
        ActivityCommand::Points(args) => {
            let assets = operator::operator()?.assets(config_toml)?;
            let points = assets.activity_points(args.address).await?;

            if output::is_json() {
                return output::result(
                    "activity.points",
                    &json!({ "address": args.address, "points": points }),
                );
            }
            output::field("Points", output::highlight(points));
            Ok(())
        }
    }
}

fn report(result: &ActivityResult) -> Result<()> {
    if output::is_json() {
        return output::result("activity.request", result);
    }

    output::section(&format!("Activity for @{}", result.identifier));
    output::field("Transaction", result.handle);
    output::field("Block", result.block_number);
    match &result.results {
        Some(points) => {
            let rows: Vec<PointsRow> = points
                .entries()
                .map(|(wallet, points)| PointsRow {
                    wallet: wallet.to_string(),
                    points: points.to_string(),
                })
                .collect();
            output::lines(&Table::new(rows).to_string());
            output::field("Total", output::positive(points.total()));
        }
        None => {
            output::warning("No result published yet");
            output::hint(&format!(
                "check later with {}",
                output::highlight("nftlend activity points <wallet>")
            ));
        }
    }
    Ok(())
}
