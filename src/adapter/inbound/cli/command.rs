//! Command-line interface definitions.
//!
//! Every subcommand reads the same configuration file. Amounts are decimal
//! strings in the unit the flag names; asset ids are decimal integers.

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};

use crate::domain::id::AssetId;

/// NFT marketplace, lending and activity-point operations
#[derive(Parser, Debug)]
#[command(name = "nftlend")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current USD price of the native asset
    Price,

    /// Convert between USD and the native asset at the current price
    Convert(ConvertArgs),

    /// List, buy and sell assets
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Borrow against assets and fund loans
    #[command(subcommand)]
    Loan(LoanCommand),

    /// Request and read activity points
    #[command(subcommand)]
    Activity(ActivityCommand),

    /// Mint assets and inspect the collection
    #[command(subcommand)]
    Asset(AssetCommand),

    /// Look up and link social handles to wallets
    #[command(subcommand)]
    Identity(IdentityCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Arguments for `nftlend convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Amount to convert
    pub amount: String,

    /// Treat the amount as native instead of USD
    #[arg(long)]
    pub from_native: bool,
}

/// Subcommands for `nftlend sale`.
#[derive(Subcommand, Debug)]
pub enum SaleCommand {
    /// List active sales with their current native price
    List,
    /// Show the sale on an asset
    Info(AssetArg),
    /// Quote the native amount a purchase would attach right now
    Quote(AssetArg),
    /// Put an asset up for sale
    Create(SaleCreateArgs),
    /// Buy an asset
    Buy(AssetArg),
    /// Withdraw an asset from sale
    Cancel(AssetArg),
}

/// Subcommands for `nftlend loan`.
#[derive(Subcommand, Debug)]
pub enum LoanCommand {
    /// List active loans
    List,
    /// List assets with a loan awaiting funding
    Available,
    /// Show the loan on an asset, with USD values
    Info(AssetArg),
    /// Request a loan against an asset
    Request(LoanRequestArgs),
    /// Fund a requested loan
    Fund(AssetArg),
    /// Repay a funded loan
    Repay(AssetArg),
    /// Cancel an unfunded loan request
    Cancel(AssetArg),
    /// Liquidate an expired loan
    Liquidate(AssetArg),
    /// Liquidate every expired loan in one transaction
    Sweep,
    /// Check whether a loan is expired at ledger time
    Expired(LoanExpiredArgs),
    /// List assets whose loans can be liquidated
    Liquidatable,
    /// Show the amount due to repay a loan
    Repayment(AssetArg),
}

/// Subcommands for `nftlend activity`.
#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// Request activity points for a social handle and wait for the result
    Request(HandleArg),
    /// Show the points recorded on the ledger for a wallet
    Points(AddressArg),
}

/// Subcommands for `nftlend asset`.
#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Mint a new asset
    Mint(MintArgs),
    /// List assets owned by a wallet (defaults to the signer)
    Owned(OptionalAddressArg),
    /// List every minted asset
    All,
    /// Show owner and metadata URI of an asset
    Info(AssetArg),
    /// Show the addresses of the related contracts
    Contracts,
    /// Show collection name, symbol and size
    Collection,
}

/// Subcommands for `nftlend identity`.
#[derive(Subcommand, Debug)]
pub enum IdentityCommand {
    /// Wallets linked to a handle
    Lookup(HandleArg),
    /// Handle linked to a wallet
    Reverse(AddressArg),
    /// Link a handle to a wallet
    Link(LinkArgs),
}

/// Subcommands for `nftlend check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file
    Config,
    /// Test connectivity to the RPC endpoint and price feed
    Connection,
}

/// A single asset id.
#[derive(Args, Debug)]
pub struct AssetArg {
    /// Asset id
    #[arg(value_parser = parse_asset_id)]
    pub asset_id: AssetId,
}

/// A wallet address.
#[derive(Args, Debug)]
pub struct AddressArg {
    /// Wallet address
    #[arg(value_parser = parse_address)]
    pub address: Address,
}

/// An optional wallet address.
#[derive(Args, Debug)]
pub struct OptionalAddressArg {
    /// Wallet address
    #[arg(value_parser = parse_address)]
    pub address: Option<Address>,
}

/// A social handle.
#[derive(Args, Debug)]
pub struct HandleArg {
    /// Handle, with or without a leading `@`
    pub handle: String,
}

/// Arguments for `nftlend sale create`.
#[derive(Args, Debug)]
pub struct SaleCreateArgs {
    /// Asset id
    #[arg(value_parser = parse_asset_id)]
    pub asset_id: AssetId,

    /// Price in USD
    #[arg(long, allow_negative_numbers = true)]
    pub price_usd: String,
}

/// Arguments for `nftlend loan request`.
#[derive(Args, Debug)]
pub struct LoanRequestArgs {
    /// Asset id used as collateral
    #[arg(value_parser = parse_asset_id)]
    pub asset_id: AssetId,

    /// Principal in USD
    #[arg(long, allow_negative_numbers = true)]
    pub amount_usd: String,

    /// Loan duration in days
    #[arg(long)]
    pub days: u64,
}

/// Arguments for `nftlend loan expired`.
#[derive(Args, Debug)]
pub struct LoanExpiredArgs {
    /// Asset id
    #[arg(value_parser = parse_asset_id)]
    pub asset_id: AssetId,

    /// Count the deadline second itself as expired
    #[arg(long)]
    pub inclusive: bool,
}

/// Arguments for `nftlend asset mint`.
#[derive(Args, Debug)]
pub struct MintArgs {
    /// Metadata URI
    pub uri: String,
}

/// Arguments for `nftlend identity link`.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Handle, with or without a leading `@`
    pub handle: String,

    /// Wallet address
    #[arg(value_parser = parse_address)]
    pub address: Address,
}

fn parse_asset_id(raw: &str) -> Result<AssetId, String> {
    raw.parse::<AssetId>()
        .map_err(|e| format!("invalid asset id '{raw}': {e}"))
}

fn parse_address(raw: &str) -> Result<Address, String> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| format!("invalid address '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn color_choice_default_is_auto() {
        assert!(matches!(ColorChoice::default(), ColorChoice::Auto));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["nftlend", "price", "--json", "-c", "other.toml"]);
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Price));
    }

    #[test]
    fn parse_loan_request() {
        let cli = Cli::parse_from([
            "nftlend",
            "loan",
            "request",
            "7",
            "--amount-usd",
            "1500",
            "--days",
            "30",
        ]);
        match cli.command {
            Commands::Loan(LoanCommand::Request(args)) => {
                assert_eq!(args.asset_id, AssetId::from(7u64));
                assert_eq!(args.amount_usd, "1500");
                assert_eq!(args.days, 30);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_price_reaches_validation() {
        let cli = Cli::parse_from(["nftlend", "sale", "create", "4", "--price-usd", "-5"]);
        match cli.command {
            Commands::Sale(SaleCommand::Create(args)) => assert_eq!(args.price_usd, "-5"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_expired_inclusive() {
        let cli = Cli::parse_from(["nftlend", "loan", "expired", "3", "--inclusive"]);
        assert!(matches!(
            cli.command,
            Commands::Loan(LoanCommand::Expired(LoanExpiredArgs {
                inclusive: true,
                ..
            }))
        ));
    }

    #[test]
    fn rejects_bad_asset_id() {
        assert!(Cli::try_parse_from(["nftlend", "sale", "buy", "abc"]).is_err());
    }

    #[test]
    fn rejects_bad_address() {
        assert!(Cli::try_parse_from(["nftlend", "identity", "reverse", "0x12"]).is_err());
    }

    #[test]
    fn owned_address_is_optional() {
        let cli = Cli::parse_from(["nftlend", "asset", "owned"]);
        assert!(matches!(
            cli.command,
            Commands::Asset(AssetCommand::Owned(OptionalAddressArg { address: None }))
        ));
    }
}
