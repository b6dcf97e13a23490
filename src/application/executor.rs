//! Transaction submission and confirmation.
//!
//! A submission is never re-sent. When confirmation times out the caller
//! keeps the handle and may call [`TransactionExecutor::confirm`] again.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::receipt::{Receipt, ReceiptStatus, TransactionHandle};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{Ledger, LedgerCall};

/// Timing for receipt confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Submits state-changing calls and waits for their receipts.
pub struct TransactionExecutor {
    ledger: Arc<dyn Ledger>,
    policy: ConfirmationPolicy,
}

impl TransactionExecutor {
    pub fn new(ledger: Arc<dyn Ledger>, policy: ConfirmationPolicy) -> Self {
        Self { ledger, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// Sign and broadcast `call`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::SubmissionFailure`] when nothing was broadcast,
    /// [`LedgerError::ExecutionReverted`] when the node refused the call.
    pub async fn submit(&self, call: &LedgerCall) -> Result<TransactionHandle> {
        match self.ledger.submit(call).await {
            Ok(handle) => {
                info!(%handle, to = %call.to, value = %call.value, "Transaction submitted");
                Ok(handle)
            }
            Err(e) => {
                warn!(to = %call.to, error = %e, "Submission rejected");
                Err(e.into())
            }
        }
    }

    /// Wait up to `timeout` for `handle` to be included.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ConfirmationTimeout`] when inclusion was not observed
    /// in time, [`LedgerError::ExecutionReverted`] when the transaction was
    /// included but reverted.
    pub async fn confirm(&self, handle: TransactionHandle, timeout: Duration) -> Result<Receipt> {
        let wait = self
            .ledger
            .wait_for_receipt(handle, self.policy.poll_interval);
        let receipt = match tokio::time::timeout(timeout, wait).await {
            Ok(receipt) => receipt?,
            Err(_) => {
                warn!(%handle, waited_secs = timeout.as_secs(), "Confirmation timed out");
                return Err(LedgerError::ConfirmationTimeout {
                    handle,
                    waited: timeout,
                }
                .into());
            }
        };

        match receipt.status() {
            ReceiptStatus::Included => {
                info!(
                    %handle,
                    block = receipt.block_number(),
                    logs = receipt.logs().len(),
                    "Transaction confirmed"
                );
                Ok(receipt)
            }
            ReceiptStatus::Reverted { reason } => {
                warn!(%handle, reason = %reason, "Transaction reverted");
                Err(LedgerError::ExecutionReverted {
                    reason: reason.clone(),
                    handle: Some(handle),
                }
                .into())
            }
        }
    }

    /// Submit `call` and confirm it with the configured timeout.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::submit`] or [`Self::confirm`].
    pub async fn execute(&self, call: &LedgerCall) -> Result<Receipt> {
        let handle = self.submit(call).await?;
        self.confirm(handle, self.policy.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::marketplace::IMarketplace;
    use crate::error::{Error, FailureCategory};
    use crate::testkit::ledger::ScriptedLedger;
    use alloy_primitives::U256;

    fn executor(ledger: Arc<ScriptedLedger>) -> TransactionExecutor {
        TransactionExecutor::new(
            ledger,
            ConfirmationPolicy {
                timeout: Duration::from_secs(30),
                poll_interval: Duration::from_secs(1),
            },
        )
    }

    fn mint(ledger: &ScriptedLedger) -> LedgerCall {
        LedgerCall::new(
            ledger.marketplace(),
            &IMarketplace::mintCall {
                uri: "ipfs://meta".into(),
            },
        )
    }

    #[tokio::test]
    async fn execute_returns_included_receipt() {
        let ledger = Arc::new(ScriptedLedger::new());
        let receipt = executor(ledger.clone()).execute(&mint(&ledger)).await.unwrap();
        assert!(receipt.is_included());
        assert_eq!(receipt.logs().len(), 1);
        assert_eq!(ledger.submissions().len(), 1);
    }

    #[tokio::test]
    async fn reverted_receipt_carries_reason_and_handle() {
        let ledger = Arc::new(ScriptedLedger::new());
        let call = LedgerCall::new(
            ledger.marketplace(),
            &IMarketplace::cancelSaleCall {
                tokenId: U256::from(4u64),
            },
        );
        let err = executor(ledger).execute(&call).await.unwrap_err();
        assert_eq!(err.category(), FailureCategory::FailedOnLedger);
        match err {
            Error::Ledger(LedgerError::ExecutionReverted { reason, handle }) => {
                assert_eq!(reason, "Sale not active");
                assert!(handle.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submission_failure_is_not_retried() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.reject_next_submission(LedgerError::SubmissionFailure("insufficient funds".into()));
        let err = executor(ledger.clone()).execute(&mint(&ledger)).await.unwrap_err();
        assert_eq!(err.category(), FailureCategory::NothingHappened);
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_handle_for_later_confirmation() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.hold_receipts(true);
        let exec = executor(ledger.clone());

        let handle = exec.submit(&mint(&ledger)).await.unwrap();
        let err = exec
            .confirm(handle, Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            Error::Ledger(LedgerError::ConfirmationTimeout { handle: h, waited }) => {
                assert_eq!(h, handle);
                assert_eq!(waited, Duration::from_secs(5));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        ledger.hold_receipts(false);
        let receipt = exec.confirm(handle, Duration::from_secs(5)).await.unwrap();
        assert_eq!(receipt.handle(), handle);
        assert_eq!(ledger.submissions().len(), 1);
    }
}
