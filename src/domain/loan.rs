//! Collateralized loans and their state machine.
//!
//! ```text
//! Requested ──fund──▶ Funded ──repay─────▶ Repaid
//!     │                  └────liquidate──▶ Liquidated
//!     └──cancel──▶ Cancelled
//! ```
//!
//! The ledger is authoritative. A [`Loan`] is a projection of the most
//! recent read, and expiry is always evaluated against a ledger time that
//! the caller reads fresh.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::AssetId;
use super::money::Money;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanState {
    Requested,
    Funded,
    Repaid,
    Liquidated,
    Cancelled,
}

/// A state-changing loan operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanAction {
    Fund,
    Repay,
    Liquidate,
    Cancel,
}

impl LoanState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Repaid | Self::Liquidated | Self::Cancelled)
    }

    /// Apply `action`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] when the action is not
    /// allowed from this state.
    pub fn apply(self, asset_id: AssetId, action: LoanAction) -> Result<Self, DomainError> {
        let next = match (self, action) {
            (Self::Requested, LoanAction::Fund) => Self::Funded,
            (Self::Requested, LoanAction::Cancel) => Self::Cancelled,
            (Self::Funded, LoanAction::Repay) => Self::Repaid,
            (Self::Funded, LoanAction::Liquidate) => Self::Liquidated,
            _ => {
                return Err(DomainError::InvalidTransition {
                    asset_id,
                    state: self,
                    action,
                })
            }
        };
        Ok(next)
    }
}

impl fmt::Display for LoanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Requested => "requested",
            Self::Funded => "funded",
            Self::Repaid => "repaid",
            Self::Liquidated => "liquidated",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl fmt::Display for LoanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fund => "fund",
            Self::Repay => "repay",
            Self::Liquidate => "liquidate",
            Self::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// How a deadline that equals "now" is treated.
///
/// The ledger only allows liquidation strictly after the deadline, which is
/// [`ExpiryBoundary::Exclusive`]. `Inclusive` treats the deadline second
/// itself as expired, which is what day-granular displays usually show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryBoundary {
    #[default]
    Exclusive,
    Inclusive,
}

/// Loan term: a duration before funding, an absolute deadline after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoanTerm {
    Pending { duration_days: u64 },
    Due { deadline: u64 },
}

impl LoanTerm {
    /// Deadline for a loan funded at `funded_at` with this term.
    #[must_use]
    pub const fn deadline_from(&self, funded_at: u64) -> u64 {
        match self {
            Self::Pending { duration_days } => {
                funded_at.saturating_add(duration_days.saturating_mul(SECONDS_PER_DAY))
            }
            Self::Due { deadline } => *deadline,
        }
    }
}

/// Snapshot of a loan, native-denominated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub asset_id: AssetId,
    /// Principal in the native asset. Before funding this is the current
    /// equivalent of the USD principal; after funding it is fixed.
    pub principal: Money,
    pub interest: Money,
    pub term: LoanTerm,
    pub borrower: Address,
    pub lender: Option<Address>,
    pub start_time: Option<u64>,
    pub active: bool,
}

impl Loan {
    /// Build a snapshot from the raw ledger tuple.
    ///
    /// A zero lender and zero start time mean "unset"; in that case the
    /// deadline field carries the requested duration in days.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_ledger(
        asset_id: AssetId,
        principal: Money,
        interest: Money,
        deadline: u64,
        borrower: Address,
        lender: Address,
        start_time: u64,
        active: bool,
    ) -> Self {
        let funded = !lender.is_zero() || start_time != 0;
        let term = if funded {
            LoanTerm::Due { deadline }
        } else {
            LoanTerm::Pending {
                duration_days: deadline,
            }
        };
        Self {
            asset_id,
            principal,
            interest,
            term,
            borrower,
            lender: (!lender.is_zero()).then_some(lender),
            start_time: (start_time != 0).then_some(start_time),
            active,
        }
    }

    #[must_use]
    pub const fn is_funded(&self) -> bool {
        matches!(self.term, LoanTerm::Due { .. })
    }

    /// Current state, or `None` for an inactive record whose outcome the
    /// read alone cannot tell.
    #[must_use]
    pub const fn state(&self) -> Option<LoanState> {
        match (self.active, self.is_funded()) {
            (false, _) => None,
            (true, false) => Some(LoanState::Requested),
            (true, true) => Some(LoanState::Funded),
        }
    }

    /// Absolute deadline once funded.
    #[must_use]
    pub const fn deadline(&self) -> Option<u64> {
        match self.term {
            LoanTerm::Due { deadline } => Some(deadline),
            LoanTerm::Pending { .. } => None,
        }
    }

    /// Whether the loan is past its deadline at ledger time `now`.
    ///
    /// Unfunded and inactive loans never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: u64, boundary: ExpiryBoundary) -> bool {
        if !self.active {
            return false;
        }
        match (self.deadline(), boundary) {
            (None, _) => false,
            (Some(deadline), ExpiryBoundary::Exclusive) => now > deadline,
            (Some(deadline), ExpiryBoundary::Inclusive) => now >= deadline,
        }
    }

    /// Seconds until the deadline at `now`, zero once it has passed.
    #[must_use]
    pub fn remaining_secs(&self, now: u64) -> Option<u64> {
        self.deadline().map(|d| d.saturating_sub(now))
    }

    /// Principal plus interest as last read.
    ///
    /// # Errors
    ///
    /// Fails on overflow or if the two amounts are in different units.
    pub fn amount_due(&self) -> Result<Money, DomainError> {
        self.principal.checked_add(self.interest)
    }
}

/// Loan amounts converted to USD at read time.
///
/// Queried independently from the native form: the USD figure is "as of
/// now", not "as of when the loan was created".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanWithUsd {
    pub loan: Loan,
    pub principal_usd: Money,
    pub interest_usd: Money,
}

/// Entry of the bulk active-loan listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanListing {
    pub asset_id: AssetId,
    pub borrower: Address,
    pub principal: Money,
    /// Duration in days before funding, absolute deadline after.
    pub term: LoanTerm,
    pub funded: bool,
}

/// Amount due to close a funded loan, in both units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentQuote {
    pub native: Money,
    pub usd: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};

    const BORROWER: Address = address!("00000000000000000000000000000000000000b0");
    const LENDER: Address = address!("00000000000000000000000000000000000000c0");

    fn funded_loan(start: u64, days: u64) -> Loan {
        Loan::from_ledger(
            AssetId::from(1u64),
            Money::native(U256::from(5u64)),
            Money::native(U256::ZERO),
            LoanTerm::Pending {
                duration_days: days,
            }
            .deadline_from(start),
            BORROWER,
            LENDER,
            start,
            true,
        )
    }

    #[test]
    fn unfunded_record_carries_duration() {
        let loan = Loan::from_ledger(
            AssetId::from(1u64),
            Money::native(U256::from(5u64)),
            Money::native(U256::ZERO),
            30,
            BORROWER,
            Address::ZERO,
            0,
            true,
        );
        assert_eq!(loan.term, LoanTerm::Pending { duration_days: 30 });
        assert_eq!(loan.state(), Some(LoanState::Requested));
        assert_eq!(loan.lender, None);
        assert!(!loan.is_expired_at(u64::MAX, ExpiryBoundary::Inclusive));
    }

    #[test]
    fn not_expired_at_funding_time() {
        let t = 1_700_000_000;
        let loan = funded_loan(t, 30);
        assert_eq!(loan.state(), Some(LoanState::Funded));
        assert!(!loan.is_expired_at(t, ExpiryBoundary::Exclusive));
        assert!(!loan.is_expired_at(t, ExpiryBoundary::Inclusive));
    }

    #[test]
    fn deadline_second_depends_on_boundary() {
        let t = 1_700_000_000;
        let loan = funded_loan(t, 30);
        let deadline = t + 30 * SECONDS_PER_DAY;
        assert_eq!(loan.deadline(), Some(deadline));

        assert!(!loan.is_expired_at(deadline, ExpiryBoundary::Exclusive));
        assert!(loan.is_expired_at(deadline, ExpiryBoundary::Inclusive));

        assert!(loan.is_expired_at(deadline + 1, ExpiryBoundary::Exclusive));
        assert!(loan.is_expired_at(deadline + 1, ExpiryBoundary::Inclusive));
    }

    #[test]
    fn inactive_loans_never_expire() {
        let mut loan = funded_loan(0, 1);
        loan.active = false;
        assert_eq!(loan.state(), None);
        assert!(!loan.is_expired_at(u64::MAX, ExpiryBoundary::Inclusive));
    }

    #[test]
    fn state_machine_allows_only_documented_transitions() {
        let id = AssetId::from(9u64);
        assert_eq!(
            LoanState::Requested.apply(id, LoanAction::Fund),
            Ok(LoanState::Funded)
        );
        assert_eq!(
            LoanState::Requested.apply(id, LoanAction::Cancel),
            Ok(LoanState::Cancelled)
        );
        assert_eq!(
            LoanState::Funded.apply(id, LoanAction::Repay),
            Ok(LoanState::Repaid)
        );
        assert_eq!(
            LoanState::Funded.apply(id, LoanAction::Liquidate),
            Ok(LoanState::Liquidated)
        );

        for action in [LoanAction::Repay, LoanAction::Liquidate] {
            assert!(LoanState::Requested.apply(id, action).is_err());
        }
        for action in [LoanAction::Fund, LoanAction::Cancel] {
            assert!(LoanState::Funded.apply(id, action).is_err());
        }
        for terminal in [LoanState::Repaid, LoanState::Liquidated, LoanState::Cancelled] {
            assert!(terminal.is_terminal());
            for action in [
                LoanAction::Fund,
                LoanAction::Repay,
                LoanAction::Liquidate,
                LoanAction::Cancel,
            ] {
                assert!(terminal.apply(id, action).is_err());
            }
        }
    }
}
