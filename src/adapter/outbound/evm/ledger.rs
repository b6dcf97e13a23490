//! [`Ledger`] over an EVM JSON-RPC endpoint.
//!
//! Reads go through `eth_call` and `eth_getLogs`. Submissions are signed
//! locally by the wallet filler, which also estimates gas; a call that would
//! revert is therefore refused before anything is broadcast.

use alloy_primitives::{Address, Bytes};
use alloy_provider::network::{EthereumWallet, TransactionBuilder};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{BlockNumberOrTag, Filter, Log, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::receipt::{LogEntry, Receipt, ReceiptStatus, TransactionHandle};
use crate::error::{ConfigError, LedgerError, Result};
use crate::port::outbound::ledger::{Ledger, LedgerCall, LedgerResult};

/// Ledger access through an HTTP JSON-RPC provider.
pub struct EvmLedger {
    provider: DynProvider,
    sender: Option<Address>,
}

impl EvmLedger {
    /// Connect to `rpc_url`. Without a signer the ledger is read-only and
    /// every submission fails with [`LedgerError::SubmissionFailure`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn connect(rpc_url: &str, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let url: url::Url =
            rpc_url
                .parse()
                .map_err(|e: url::ParseError| ConfigError::InvalidValue {
                    field: "network.rpc_url",
                    reason: e.to_string(),
                })?;

        let sender = signer.as_ref().map(alloy_signer::Signer::address);
        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };

        Ok(Self { provider, sender })
    }

    fn request(&self, call: &LedgerCall) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_to(call.to)
            .with_input(call.input.clone())
            .with_value(call.value);
        if let Some(from) = self.sender {
            tx = tx.with_from(from);
        }
        tx
    }
}

/// Map a node error to a revert when the node says the call reverted.
fn classify(error: &TransportError, otherwise: fn(String) -> LedgerError) -> LedgerError {
    if let Some(payload) = error.as_error_resp() {
        if let Some(reason) = payload
            .as_revert_data()
            .and_then(|data| alloy_sol_types::decode_revert_reason(&data))
        {
            return LedgerError::ExecutionReverted {
                reason,
                handle: None,
            };
        }
        if payload.message.contains("revert") {
            return LedgerError::ExecutionReverted {
                reason: payload.message.to_string(),
                handle: None,
            };
        }
    }
    otherwise(error.to_string())
}

fn log_entry(log: &Log) -> LogEntry {
    LogEntry {
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
        block_number: log.block_number,
        log_index: log.log_index,
    }
}

#[async_trait]
impl Ledger for EvmLedger {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn call(&self, call: &LedgerCall) -> LedgerResult<Bytes> {
        self.provider
            .call(self.request(call))
            .await
            .map_err(|e| classify(&e, LedgerError::Read))
    }

    async fn submit(&self, call: &LedgerCall) -> LedgerResult<TransactionHandle> {
        if self.sender.is_none() {
            return Err(LedgerError::SubmissionFailure(
                "no wallet configured (set WALLET_PRIVATE_KEY)".to_string(),
            ));
        }

        let pending = self
            .provider
            .send_transaction(self.request(call))
            .await
            .map_err(|e| classify(&e, LedgerError::SubmissionFailure))?;
        let handle = TransactionHandle::new(*pending.tx_hash());
        info!(%handle, to = %call.to, value = %call.value, "Transaction broadcast");
        Ok(handle)
    }

    async fn receipt(&self, handle: TransactionHandle) -> LedgerResult<Option<Receipt>> {
        let Some(receipt) = self
            .provider
            .get_transaction_receipt(handle.hash())
            .await
            .map_err(|e| LedgerError::Read(e.to_string()))?
        else {
            return Ok(None);
        };

        let block = receipt.block_number.unwrap_or_default();
        let status = if receipt.status() {
            ReceiptStatus::Included
        } else {
            // Receipts carry no reason; the node refuses most reverts
            // during estimation, so this is a state change between the two.
            ReceiptStatus::Reverted {
                reason: format!("reverted in block {block}"),
            }
        };
        let logs = receipt.inner.logs().iter().map(log_entry).collect();
        debug!(%handle, block, "Receipt received");
        Ok(Some(Receipt::new(handle, status, logs, block)))
    }

    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> LedgerResult<Vec<LogEntry>> {
        let filter = Filter::new()
            .address(address)
            .from_block(from_block)
            .to_block(to_block);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| LedgerError::Read(e.to_string()))?;
        Ok(logs.iter().map(log_entry).collect())
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| LedgerError::Read(e.to_string()))
    }

    async fn block_timestamp(&self) -> LedgerResult<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| LedgerError::Read(e.to_string()))?
            .ok_or_else(|| LedgerError::Read("latest block not available".to_string()))?;
        Ok(block.header.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(
            EvmLedger::connect("not a url", None),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "network.rpc_url",
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn read_only_ledger_refuses_submissions() {
        let ledger = EvmLedger::connect("http://127.0.0.1:1", None).unwrap();
        assert_eq!(ledger.sender(), None);

        let err = ledger
            .submit(&LedgerCall {
                to: Address::ZERO,
                input: Bytes::new(),
                value: alloy_primitives::U256::ZERO,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SubmissionFailure(_)));
    }
}
