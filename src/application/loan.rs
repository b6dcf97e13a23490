//! Loan lifecycle: request, fund, repay, cancel, liquidate.
//!
//! Principal is requested in USD and fixed in the native asset at funding.
//! Every value attached to a submission is read fresh just before it, and
//! expiry is judged against ledger time, never the local clock.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{info, warn};

use super::executor::TransactionExecutor;
use super::resolver::EventResolver;
use crate::contract::call::read;
use crate::contract::marketplace::IMarketplace;
use crate::domain::error::DomainError;
use crate::domain::event::{DomainEvent, EventKind};
use crate::domain::id::AssetId;
use crate::domain::loan::{
    ExpiryBoundary, Loan, LoanAction, LoanListing, LoanState, LoanTerm, LoanWithUsd,
    RepaymentQuote,
};
use crate::domain::money::{Money, Unit};
use crate::domain::receipt::Receipt;
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{Ledger, LedgerCall};

/// Receipt of a loan operation and the event it emitted, if found.
#[derive(Debug, Clone, Serialize)]
pub struct LoanOutcome {
    pub receipt: Receipt,
    pub event: Option<DomainEvent>,
}

/// Result of a bulk liquidation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct LiquidationReport {
    pub receipt: Receipt,
    /// Assets named by `LoanLiquidated` events in the receipt.
    pub liquidated: Vec<AssetId>,
    /// Assets still liquidatable after inclusion, read fresh.
    pub still_liquidatable: Vec<AssetId>,
}

fn to_u64(field: &str, value: U256) -> std::result::Result<u64, LedgerError> {
    u64::try_from(value).map_err(|_| LedgerError::Decode(format!("{field} does not fit in u64")))
}

/// Orchestrates loans against the lending side of the marketplace.
pub struct LoanLifecycle {
    ledger: Arc<dyn Ledger>,
    executor: Arc<TransactionExecutor>,
    resolver: EventResolver,
    marketplace: Address,
}

impl LoanLifecycle {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        executor: Arc<TransactionExecutor>,
        resolver: EventResolver,
        marketplace: Address,
    ) -> Self {
        Self {
            ledger,
            executor,
            resolver,
            marketplace,
        }
    }

    /// Ask for a loan of `principal_usd` against `asset_id` for `duration_days`.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidPrincipal`] or [`DomainError::InvalidDuration`]
    /// before any ledger interaction; otherwise ledger errors.
    pub async fn request(
        &self,
        asset_id: AssetId,
        principal_usd: Money,
        duration_days: u64,
    ) -> Result<LoanOutcome> {
        principal_usd.expect_unit(Unit::Usd)?;
        if principal_usd.is_zero() {
            return Err(DomainError::InvalidPrincipal {
                principal: principal_usd.to_string(),
            }
            .into());
        }
        if duration_days == 0 {
            return Err(DomainError::InvalidDuration {
                days: duration_days,
            }
            .into());
        }

        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::requestLoanCall {
                tokenId: asset_id.as_u256(),
                loanAmountUSD: principal_usd.raw(),
                durationInDays: U256::from(duration_days),
            },
        );
        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, principal = %principal_usd, duration_days, "Loan requested");
        Ok(self.outcome(receipt, EventKind::LoanRequested))
    }

    /// Fund the requested loan on `asset_id`, attaching exactly the native
    /// principal read just before submission.
    ///
    /// # Errors
    ///
    /// [`DomainError::LoanNotFound`] when no loan is active,
    /// [`DomainError::InvalidTransition`] when it is already funded.
    pub async fn fund(&self, asset_id: AssetId) -> Result<LoanOutcome> {
        let loan = self
            .loan_info(asset_id)
            .await?
            .ok_or(DomainError::LoanNotFound { asset_id })?;
        let state = loan.state().ok_or(DomainError::LoanNotFound { asset_id })?;
        state.apply(asset_id, LoanAction::Fund)?;

        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::fundLoanCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .with_value(loan.principal.raw());

        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, principal = %loan.principal, "Loan funded");
        Ok(self.outcome(receipt, EventKind::LoanFunded))
    }

    /// Repay the funded loan on `asset_id` with the freshly read total due.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the loan is not funded or the
    /// caller is not the borrower.
    pub async fn repay(&self, asset_id: AssetId) -> Result<LoanOutcome> {
        let due = self.total_repayment_amount(asset_id).await?;
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::repayLoanCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .with_value(due.raw());

        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, paid = %due, "Loan repaid");
        Ok(self.outcome(receipt, EventKind::LoanRepaid))
    }

    /// Claim the collateral of an expired loan.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the loan has not expired.
    pub async fn liquidate(&self, asset_id: AssetId) -> Result<LoanOutcome> {
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::liquidateAssetCall {
                tokenId: asset_id.as_u256(),
            },
        );
        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, "Loan liquidated");
        Ok(self.outcome(receipt, EventKind::LoanLiquidated))
    }

    /// Withdraw an unfunded loan request.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the loan is funded or the
    /// caller is not the borrower.
    pub async fn cancel_request(&self, asset_id: AssetId) -> Result<LoanOutcome> {
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::cancelLoanRequestCall {
                tokenId: asset_id.as_u256(),
            },
        );
        let receipt = self.executor.execute(&call).await?;
        info!(%asset_id, "Loan request cancelled");
        Ok(self.outcome(receipt, EventKind::LoanCancelled))
    }

    /// Liquidate every expired loan in one transaction.
    ///
    /// The report lists what the receipt's events say was liquidated and
    /// what the ledger still considers liquidatable afterwards.
    ///
    /// # Errors
    ///
    /// Submission, confirmation, or the follow-up read failing.
    pub async fn check_and_prepare_liquidations(&self) -> Result<LiquidationReport> {
        let call = LedgerCall::new(
            self.marketplace,
            &IMarketplace::checkAndPrepareLiquidationsCall {},
        );
        let receipt = self.executor.execute(&call).await?;

        let liquidated: Vec<AssetId> = self
            .resolver
            .extract_all(receipt.logs(), EventKind::LoanLiquidated)
            .iter()
            .filter_map(DomainEvent::asset_id)
            .collect();
        let still_liquidatable = self.liquidatable_tokens().await?;

        if still_liquidatable.is_empty() {
            info!(liquidated = liquidated.len(), "Liquidation sweep complete");
        } else {
            warn!(
                liquidated = liquidated.len(),
                remaining = still_liquidatable.len(),
                "Liquidation sweep left expired loans behind"
            );
        }

        Ok(LiquidationReport {
            receipt,
            liquidated,
            still_liquidatable,
        })
    }

    /// The active loan on `asset_id`, native-denominated.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn loan_info(&self, asset_id: AssetId) -> Result<Option<Loan>> {
        let info = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getLoanInfoCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?;
        if !info.isActive {
            return Ok(None);
        }

        Ok(Some(Loan::from_ledger(
            asset_id,
            Money::native(info.loanAmount),
            Money::native(info.interestAmount),
            to_u64("deadline", info.deadline)?,
            info.borrower,
            info.lender,
            to_u64("startTime", info.startTime)?,
            info.isActive,
        )))
    }

    /// The active loan on `asset_id` with USD figures as of now.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn loan_info_with_usd(&self, asset_id: AssetId) -> Result<Option<LoanWithUsd>> {
        let info = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getLoanInfoWithUSDCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?;
        if !info.active {
            return Ok(None);
        }

        let loan = Loan::from_ledger(
            asset_id,
            Money::native(info.loanAmountETH),
            Money::native(info.interestAmountETH),
            to_u64("deadline", info.deadline)?,
            info.borrower,
            info.lender,
            to_u64("startTime", info.startTime)?,
            info.active,
        );
        Ok(Some(LoanWithUsd {
            loan,
            principal_usd: Money::usd(info.loanAmountUSD),
            interest_usd: Money::usd(info.interestAmountUSD),
        }))
    }

    /// Every active loan, funded or not.
    ///
    /// # Errors
    ///
    /// Read or decode failures, including mismatched array lengths.
    pub async fn active_loans(&self) -> Result<Vec<LoanListing>> {
        let loans = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getAllActiveLoansCall {},
        )
        .await?;

        let n = loans.tokenIds.len();
        if loans.borrowers.len() != n
            || loans.loanAmounts.len() != n
            || loans.deadlines.len() != n
            || loans.isFunded.len() != n
        {
            return Err(LedgerError::Decode(format!(
                "getAllActiveLoans returned uneven arrays ({n} tokens)"
            ))
            .into());
        }

        let mut listings = Vec::with_capacity(n);
        for i in 0..n {
            let funded = loans.isFunded[i];
            let value = to_u64("deadline", loans.deadlines[i])?;
            listings.push(LoanListing {
                asset_id: AssetId::new(loans.tokenIds[i]),
                borrower: loans.borrowers[i],
                principal: Money::native(loans.loanAmounts[i]),
                term: if funded {
                    LoanTerm::Due { deadline: value }
                } else {
                    LoanTerm::Pending {
                        duration_days: value,
                    }
                },
                funded,
            });
        }
        Ok(listings)
    }

    /// Assets with an open, unfunded loan request.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn tokens_for_loan(&self) -> Result<Vec<AssetId>> {
        let ids = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getTokensForLoanCall {},
        )
        .await?;
        Ok(ids.into_iter().map(AssetId::new).collect())
    }

    /// The ledger's own expiry verdict for `asset_id`.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn is_loan_expired(&self, asset_id: AssetId) -> Result<bool> {
        Ok(read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::isLoanExpiredCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?)
    }

    /// Assets whose loans can be liquidated now.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn liquidatable_tokens(&self) -> Result<Vec<AssetId>> {
        let ids = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getLiquidatableTokensCall {},
        )
        .await?;
        Ok(ids.into_iter().map(AssetId::new).collect())
    }

    /// Principal plus interest due on `asset_id`, in the native asset.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the loan is not funded.
    pub async fn total_repayment_amount(&self, asset_id: AssetId) -> Result<Money> {
        let raw = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getTotalRepaymentAmountCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?;
        Ok(Money::native(raw))
    }

    /// Total due in both units.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ExecutionReverted`] when the loan is not funded.
    pub async fn total_repayment_amount_with_usd(&self, asset_id: AssetId) -> Result<RepaymentQuote> {
        let due = read(
            self.ledger.as_ref(),
            self.marketplace,
            IMarketplace::getTotalRepaymentAmountWithUSDCall {
                tokenId: asset_id.as_u256(),
            },
        )
        .await?;
        Ok(RepaymentQuote {
            native: Money::native(due.ethAmount),
            usd: Money::usd(due.usdAmount),
        })
    }

    /// Whether the loan on `asset_id` is expired at ledger time `now`.
    ///
    /// The loan is read fresh; an asset without an active loan is never
    /// expired.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn expiry_at(
        &self,
        asset_id: AssetId,
        now: u64,
        boundary: ExpiryBoundary,
    ) -> Result<bool> {
        Ok(self
            .loan_info(asset_id)
            .await?
            .is_some_and(|loan| loan.is_expired_at(now, boundary)))
    }

    /// Timestamp of the latest block.
    ///
    /// # Errors
    ///
    /// Read failures.
    pub async fn ledger_time(&self) -> Result<u64> {
        Ok(self.ledger.block_timestamp().await?)
    }

    /// State of the loan on `asset_id` as of now.
    ///
    /// # Errors
    ///
    /// Read or decode failures.
    pub async fn state(&self, asset_id: AssetId) -> Result<Option<LoanState>> {
        Ok(self.loan_info(asset_id).await?.and_then(|l| l.state()))
    }

    fn outcome(&self, receipt: Receipt, kind: EventKind) -> LoanOutcome {
        let event = self.resolver.extract(&receipt, kind);
        LoanOutcome { receipt, event }
    }
}
