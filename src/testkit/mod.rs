//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`]: `ScriptedLedger`, an in-memory [`Ledger`](crate::port::outbound::ledger::Ledger)
//!   that simulates the marketplace and activity contracts.
//! - [`fixture`]: Well-known addresses, amounts and log builders.
//! - [`config`]: Canonical test configurations and service wiring.

pub mod config;
pub mod fixture;
pub mod ledger;
