//! Typed read-only calls.

use alloy_primitives::Address;
use alloy_sol_types::SolCall;

use crate::error::LedgerError;
use crate::port::outbound::ledger::{Ledger, LedgerCall, LedgerResult};

/// Run a read-only call and decode its return value.
///
/// # Errors
///
/// Propagates the ledger failure, or [`LedgerError::Decode`] when the
/// returned bytes do not match the function's outputs.
pub async fn read<C: SolCall>(ledger: &dyn Ledger, to: Address, call: C) -> LedgerResult<C::Return> {
    let output = ledger.call(&LedgerCall::new(to, &call)).await?;
    C::abi_decode_returns(&output)
        .map_err(|e| LedgerError::Decode(format!("{}: {e}", C::SIGNATURE)))
}
