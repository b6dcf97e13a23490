//! Handlers for `loan` subcommands.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::{AssetArg, LoanCommand, LoanExpiredArgs, LoanRequestArgs};
use super::{operator, output, receipt};
use crate::application::loan::{LoanLifecycle, LoanOutcome};
use crate::domain::event::EventKind;
use crate::domain::id::AssetId;
use crate::domain::loan::{ExpiryBoundary, LoanListing, LoanTerm};
use crate::domain::money::Money;
use crate::error::Result;

#[derive(Tabled)]
struct LoanRow {
    #[tabled(rename = "Asset")]
    asset_id: String,
    #[tabled(rename = "Borrower")]
    borrower: String,
    #[tabled(rename = "Principal (ETH)")]
    principal: String,
    #[tabled(rename = "Term")]
    term: String,
}

impl From<&LoanListing> for LoanRow {
    fn from(listing: &LoanListing) -> Self {
        Self {
            asset_id: listing.asset_id.to_string(),
            borrower: listing.borrower.to_string(),
            principal: listing.principal.amount_string(),
            term: term(&listing.term),
        }
    }
}

fn term(term: &LoanTerm) -> String {
    match term {
        LoanTerm::Pending { duration_days } => format!("{duration_days} days, unfunded"),
        LoanTerm::Due { deadline } => format!("due {}", receipt::timestamp(*deadline)),
    }
}

/// Dispatch a `loan` subcommand.
pub async fn execute(config_toml: &str, command: &LoanCommand) -> Result<()> {
    let loans = operator::operator()?.loans(config_toml)?;
    match command {
        LoanCommand::List => list(&loans).await,
        LoanCommand::Available => ids(
            "loan.available",
            "Awaiting funding",
            loans.tokens_for_loan().await?,
        ),
        LoanCommand::Liquidatable => ids(
            "loan.liquidatable",
            "Liquidatable",
            loans.liquidatable_tokens().await?,
        ),
        LoanCommand::Info(args) => info(&loans, args).await,
        LoanCommand::Request(args) => request(&loans, args).await,
        LoanCommand::Fund(args) => transaction(
            "loan.fund",
            "Loan funded",
            loans.fund(args.asset_id).await?,
            EventKind::LoanFunded,
        ),
        LoanCommand::Repay(args) => transaction(
            "loan.repay",
            "Loan repaid",
            loans.repay(args.asset_id).await?,
            EventKind::LoanRepaid,
        ),
        LoanCommand::Cancel(args) => transaction(
            "loan.cancel",
            "Loan request cancelled",
            loans.cancel_request(args.asset_id).await?,
            EventKind::LoanCancelled,
        ),
        LoanCommand::Liquidate(args) => transaction(
            "loan.liquidate",
            "Loan liquidated",
            loans.liquidate(args.asset_id).await?,
            EventKind::LoanLiquidated,
        ),
        LoanCommand::Sweep => sweep(&loans).await,
        LoanCommand::Expired(args) => expired(&loans, args).await,
        LoanCommand::Repayment(args) => repayment(&loans, args).await,
    }
}

fn transaction(command: &str, title: &str, outcome: LoanOutcome, expected: EventKind) -> Result<()> {
    receipt::report(
        command,
        title,
        &outcome,
        &outcome.receipt,
        outcome.event.as_ref(),
        expected,
    )
}

fn ids(command: &str, title: &str, assets: Vec<AssetId>) -> Result<()> {
    if output::is_json() {
        return output::result(command, &assets);
    }

    output::section(title);
    if assets.is_empty() {
        output::note("None");
    }
    for id in assets {
        output::lines(&id.to_string());
    }
    Ok(())
}

async fn list(loans: &LoanLifecycle) -> Result<()> {
    let listings = loans.active_loans().await?;

    if output::is_json() {
        return output::result("loan.list", &listings);
    }

    output::section("Active loans");
    if listings.is_empty() {
        output::note("No active loans");
        return Ok(());
    }
    let rows: Vec<LoanRow> = listings.iter().map(LoanRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

async fn info(loans: &LoanLifecycle, args: &AssetArg) -> Result<()> {
    let (loan, now) = tokio::try_join!(
        loans.loan_info_with_usd(args.asset_id),
        loans.ledger_time()
    )?;

    if output::is_json() {
        return output::result("loan.info", &json!({ "loan": loan, "ledger_time": now }));
    }

    output::section(&format!("Loan on asset {}", args.asset_id));
    let Some(detail) = loan else {
        output::note("No active loan");
        return Ok(());
    };
    let loan = &detail.loan;
    output::field("Borrower", loan.borrower);
    if let Some(lender) = loan.lender {
        output::field("Lender", lender);
    }
    output::field(
        "Principal",
        format!("{} ({})", loan.principal, output::muted(detail.principal_usd)),
    );
    output::field(
        "Interest",
        format!("{} ({})", loan.interest, output::muted(detail.interest_usd)),
    );
    output::field("Term", term(&loan.term));
    if let Some(state) = loan.state() {
        output::field("State", state);
    }
    if loan.is_expired_at(now, ExpiryBoundary::Exclusive) {
        output::warning("Loan is past its deadline and can be liquidated");
    } else if let Some(remaining) = loan.remaining_secs(now) {
        output::field("Remaining", format!("{}h", remaining / 3_600));
    }
    Ok(())
}

async fn request(loans: &LoanLifecycle, args: &LoanRequestArgs) -> Result<()> {
    let principal = Money::parse_principal_usd(&args.amount_usd)?;
    transaction(
        "loan.request",
        "Loan requested",
        loans.request(args.asset_id, principal, args.days).await?,
        EventKind::LoanRequested,
    )
}

async fn sweep(loans: &LoanLifecycle) -> Result<()> {
    let report = loans.check_and_prepare_liquidations().await?;

    if output::is_json() {
        return output::result("loan.sweep", &report);
    }

    output::section("Liquidation sweep");
    output::field("Transaction", report.receipt.handle());
    output::field("Liquidated", report.liquidated.len());
    for id in &report.liquidated {
        output::lines(&id.to_string());
    }
    if report.still_liquidatable.is_empty() {
        output::success("No liquidatable loans remain");
    } else {
        output::warning(&format!(
            "{} loans are still liquidatable",
            report.still_liquidatable.len()
        ));
    }
    Ok(())
}

async fn expired(loans: &LoanLifecycle, args: &LoanExpiredArgs) -> Result<()> {
    let boundary = if args.inclusive {
        ExpiryBoundary::Inclusive
    } else {
        ExpiryBoundary::Exclusive
    };
    let now = loans.ledger_time().await?;
    let (expired, ledger_verdict) = tokio::try_join!(
        loans.expiry_at(args.asset_id, now, boundary),
        loans.is_loan_expired(args.asset_id)
    )?;

    if output::is_json() {
        return output::result(
            "loan.expired",
            &json!({
                "asset_id": args.asset_id,
                "ledger_time": now,
                "boundary": boundary,
                "expired": expired,
                "ledger_expired": ledger_verdict,
            }),
        );
    }

    output::field("Ledger time", receipt::timestamp(now));
    if expired {
        output::field("Expired", output::negative("yes"));
    } else {
        output::field("Expired", output::positive("no"));
    }
    if expired != ledger_verdict {
        output::note("The contract judges expiry at the deadline boundary differently");
    }
    Ok(())
}

async fn repayment(loans: &LoanLifecycle, args: &AssetArg) -> Result<()> {
    let quote = loans.total_repayment_amount_with_usd(args.asset_id).await?;

    if output::is_json() {
        return output::result("loan.repayment", &quote);
    }

    output::section(&format!("Repayment for asset {}", args.asset_id));
    output::field("Due", output::highlight(quote.native));
    output::field("Value", quote.usd);
    Ok(())
}
