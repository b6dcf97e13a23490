//! Ledger-agnostic domain types for sales, loans, and activity.

pub mod activity;
pub mod asset;
pub mod error;
pub mod event;
pub mod id;
pub mod loan;
pub mod money;
pub mod receipt;
pub mod sale;
