//! Application services (use cases).
//!
//! These services orchestrate domain logic over the [`Ledger`] port to
//! implement sales, loans, minting and activity requests.
//!
//! [`Ledger`]: crate::port::outbound::ledger::Ledger

pub mod activity;
pub mod asset;
pub mod executor;
pub mod loan;
pub mod oracle;
pub mod polling;
pub mod resolver;
pub mod sale;
