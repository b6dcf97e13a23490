//! Handlers for `identity` subcommands.

use serde_json::json;

use super::command::IdentityCommand;
use super::{operator, output};
use crate::error::Result;

/// Dispatch an `identity` subcommand.
pub async fn execute(config_toml: &str, command: &IdentityCommand) -> Result<()> {
    let directory = operator::operator()?.identity(config_toml)?;
    match command {
        IdentityCommand::Lookup(args) => {
            let wallets = directory.lookup(&args.handle).await?;
            if output::is_json() {
                return output::result(
                    "identity.lookup",
                    &json!({ "handle": args.handle, "wallets": wallets }),
                );
            }
            if wallets.is_empty() {
                output::note(&format!("No wallets linked to {}", args.handle));
            }
            for wallet in wallets {
                output::lines(&wallet.to_string());
            }
            Ok(())
        }
        IdentityCommand::Reverse(args) => {
            let handle = directory.reverse_lookup(args.address).await?;
            if output::is_json() {
                return output::result(
                    "identity.reverse",
                    &json!({ "address": args.address, "handle": handle }),
                );
            }
            match handle {
                Some(handle) => output::field("Handle", output::highlight(format!("@{handle}"))),
                None => output::note("No handle linked to this wallet"),
            }
            Ok(())
        }
        IdentityCommand::Link(args) => {
            directory.upsert(&args.handle, args.address).await?;
            if output::is_json() {
                return output::result(
                    "identity.link",
                    &json!({ "handle": args.handle, "address": args.address }),
                );
            }
            output::success(&format!("Linked {} to {}", args.handle, args.address));
            Ok(())
        }
    }
}
