//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the remote ledger and the off-ledger identity
//! directory.

pub mod identity;
pub mod ledger;
