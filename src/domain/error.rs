//! Domain validation errors.
//!
//! Raised before any ledger interaction when a request violates a local rule.

use thiserror::Error;

use super::id::AssetId;
use super::loan::{LoanAction, LoanState};
use super::money::Unit;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Listing prices must be strictly positive.
    #[error("price must be positive, got {price}")]
    InvalidPrice {
        /// The rejected price, formatted with its unit.
        price: String,
    },

    /// Loan principals must be strictly positive.
    #[error("loan principal must be positive, got {principal}")]
    InvalidPrincipal {
        /// The rejected principal, formatted with its unit.
        principal: String,
    },

    /// Loan durations are whole days and must be at least one.
    #[error("loan duration must be at least one day, got {days}")]
    InvalidDuration {
        /// The rejected duration.
        days: u64,
    },

    /// Arithmetic or conversion across units without going through a rate.
    #[error("unit mismatch: expected {expected}, got {actual}")]
    UnitMismatch {
        /// The unit the operation requires.
        expected: Unit,
        /// The unit that was supplied.
        actual: Unit,
    },

    /// Decimal input carries more fractional digits than the unit supports.
    #[error("{unit} amounts support at most {} decimals", unit.decimals())]
    ExcessPrecision {
        /// The unit being parsed.
        unit: Unit,
    },

    /// Input that does not parse as a decimal number.
    #[error("not a number: {input}")]
    InvalidNumber {
        /// The rejected input.
        input: String,
    },

    /// Negative amounts have no meaning on the ledger.
    #[error("amount cannot be negative")]
    NegativeAmount,

    /// Fixed-point arithmetic overflowed.
    #[error("amount overflow")]
    Overflow,

    /// The price feed answered with a non-positive rate.
    #[error("price feed returned a non-positive rate: {answer}")]
    InvalidPriceFeed {
        /// The raw feed answer.
        answer: String,
    },

    /// The loan state machine does not allow this action from the current state.
    #[error("cannot {action} loan for asset {asset_id} in state {state}")]
    InvalidTransition {
        /// Collateral asset of the loan.
        asset_id: AssetId,
        /// State observed on the most recent read.
        state: LoanState,
        /// The rejected action.
        action: LoanAction,
    },

    /// No active loan exists for the asset.
    #[error("no active loan for asset {asset_id}")]
    LoanNotFound {
        /// The asset that was queried.
        asset_id: AssetId,
    },

    /// Identity handles must contain something besides `@` and whitespace.
    #[error("handle cannot be empty")]
    EmptyHandle,
}
