//! EVM JSON-RPC ledger adapter.

pub mod ledger;
pub mod signer;
