//! Ledger port.
//!
//! The ledger is a remote, authoritative state machine. The client submits
//! signed calls, observes receipts and reads historical logs. Signing is an
//! opaque capability of the implementation.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::receipt::{LogEntry, Receipt, TransactionHandle};
use crate::error::LedgerError;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// An encoded contract call with an optional native value attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub to: Address,
    pub input: Bytes,
    pub value: U256,
}

impl LedgerCall {
    /// Encode `call` for the contract at `to`.
    pub fn new<C: SolCall>(to: Address, call: &C) -> Self {
        Self {
            to,
            input: call.abi_encode().into(),
            value: U256::ZERO,
        }
    }

    /// Attach native value to the call.
    #[must_use]
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// The four-byte function selector, if the input carries one.
    #[must_use]
    pub fn selector(&self) -> Option<FixedBytes<4>> {
        self.input
            .get(..4)
            .and_then(|s| <[u8; 4]>::try_from(s).ok())
            .map(FixedBytes::from)
    }
}

/// Access to the remote ledger.
///
/// Implementations must be thread-safe (`Send + Sync`). Nothing here retries
/// a submission; callers decide what to do with an unconfirmed handle.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Address that signs submissions, if a signer is configured.
    fn sender(&self) -> Option<Address>;

    /// Execute a read-only call against the latest state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Read`] on transport failure, or
    /// [`LedgerError::ExecutionReverted`] when the call itself reverts.
    async fn call(&self, call: &LedgerCall) -> LedgerResult<Bytes>;

    /// Sign and broadcast a state-changing call.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SubmissionFailure`] when nothing was broadcast,
    /// or [`LedgerError::ExecutionReverted`] when the node rejected the call
    /// before inclusion.
    async fn submit(&self, call: &LedgerCall) -> LedgerResult<TransactionHandle>;

    /// The receipt for `handle`, or `None` while it is not yet included.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Read`] when the lookup fails.
    async fn receipt(&self, handle: TransactionHandle) -> LedgerResult<Option<Receipt>>;

    /// Logs emitted by `address` in the inclusive block range.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Read`] when the query fails.
    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> LedgerResult<Vec<LogEntry>>;

    /// Current block height.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Read`] when the query fails.
    async fn block_number(&self) -> LedgerResult<u64>;

    /// Timestamp of the latest block, in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Read`] when the query fails.
    async fn block_timestamp(&self) -> LedgerResult<u64>;

    /// Poll [`Ledger::receipt`] until the transaction is included.
    ///
    /// Never returns on its own while the transaction stays pending; bound it
    /// with a timeout. Failed lookups are logged and polled again.
    async fn wait_for_receipt(
        &self,
        handle: TransactionHandle,
        poll_interval: Duration,
    ) -> LedgerResult<Receipt> {
        loop {
            match self.receipt(handle).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => debug!(%handle, "Transaction pending"),
                Err(e) => warn!(%handle, error = %e, "Receipt lookup failed"),
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::marketplace::IMarketplace;

    #[test]
    fn call_carries_selector_and_value() {
        let call = LedgerCall::new(
            Address::ZERO,
            &IMarketplace::purchaseNFTCall {
                tokenId: U256::from(3u64),
            },
        )
        .with_value(U256::from(10u64));

        assert_eq!(
            call.selector(),
            Some(FixedBytes::from(IMarketplace::purchaseNFTCall::SELECTOR))
        );
        assert_eq!(call.value, U256::from(10u64));
        assert_eq!(call.input.len(), 4 + 32);
    }

    #[test]
    fn empty_input_has_no_selector() {
        let call = LedgerCall {
            to: Address::ZERO,
            input: Bytes::new(),
            value: U256::ZERO,
        };
        assert_eq!(call.selector(), None);
    }
}
