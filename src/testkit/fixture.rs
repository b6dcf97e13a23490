//! Addresses and log builders for tests.
//!
//! Logs are produced through the same `sol!` event types the schema decodes,
//! so fixtures never drift from the contract interface.

use alloy_primitives::{address, Address, U256};
use alloy_sol_types::SolEvent;

use crate::contract::activity::IActivityRequest;
use crate::contract::marketplace::IMarketplace;
use crate::domain::receipt::LogEntry;

pub const MARKETPLACE: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
pub const ACTIVITY: Address = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");
pub const PRICE_FEED: Address = address!("9fe46736679d2d9a65f0992f2272de9f3c7fa6e0");

pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
pub const CAROL: Address = address!("00000000000000000000000000000000000ca201");

/// Ledger time the scripted ledger starts at.
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// Build a log entry for `event` emitted by `address`.
pub fn log_entry<E: SolEvent>(address: Address, event: &E) -> LogEntry {
    let data = event.encode_log_data();
    LogEntry {
        address,
        topics: data.topics().to_vec(),
        data: data.data,
        block_number: None,
        log_index: None,
    }
}

/// Same as [`log_entry`], placed at `block`.
pub fn log_at<E: SolEvent>(address: Address, event: &E, block: u64) -> LogEntry {
    LogEntry {
        block_number: Some(block),
        ..log_entry(address, event)
    }
}

/// `ActivityCalculated` with the given wallets and points.
pub fn activity_log(wallets: Vec<Address>, points: Vec<u64>) -> LogEntry {
    log_entry(
        ACTIVITY,
        &IActivityRequest::ActivityCalculated {
            wallets,
            activityPoints: points.into_iter().map(U256::from).collect(),
        },
    )
}

/// `ActivityCalculated` with nothing in it.
pub fn empty_activity_log() -> LogEntry {
    activity_log(Vec::new(), Vec::new())
}

pub fn sale_created_log(token_id: u64, seller: Address, price_usd: U256) -> LogEntry {
    log_entry(
        MARKETPLACE,
        &IMarketplace::SaleCreated {
            tokenId: U256::from(token_id),
            seller,
            priceUSD: price_usd,
        },
    )
}

pub fn loan_liquidated_log(token_id: u64, lender: Address) -> LogEntry {
    log_entry(
        MARKETPLACE,
        &IMarketplace::LoanLiquidated {
            tokenId: U256::from(token_id),
            lender,
        },
    )
}

/// A log no schema layout matches.
pub fn unrelated_log() -> LogEntry {
    log_entry(
        MARKETPLACE,
        &IMarketplace::Transfer {
            from: Address::ZERO,
            to: ALICE,
            tokenId: U256::from(99u64),
        },
    )
}

/// One whole dollar in 8-decimal fixed point.
pub fn usd(dollars: u64) -> U256 {
    U256::from(dollars) * U256::from(100_000_000u64)
}

/// One whole ETH in wei.
pub fn eth(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}
