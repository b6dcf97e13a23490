//! Submitted transactions and their terminal receipts.

use std::fmt;

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Opaque handle of a submitted, not yet confirmed ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHandle(B256);

impl TransactionHandle {
    #[must_use]
    pub const fn new(hash: B256) -> Self {
        Self(hash)
    }

    /// The transaction hash.
    #[must_use]
    pub const fn hash(&self) -> B256 {
        self.0
    }
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw log entry as emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics; the first is the event signature hash.
    pub topics: Vec<B256>,
    /// Non-indexed ABI-encoded data.
    pub data: Bytes,
    /// Block the log was included in, when known.
    pub block_number: Option<u64>,
    /// Position of the log within its block, when known.
    pub log_index: Option<u64>,
}

impl LogEntry {
    /// The event signature topic, if any.
    #[must_use]
    pub fn signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// Terminal status of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptStatus {
    Included,
    Reverted { reason: String },
}

/// Terminal record of a submitted transaction. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    handle: TransactionHandle,
    status: ReceiptStatus,
    logs: Vec<LogEntry>,
    block_number: u64,
}

impl Receipt {
    #[must_use]
    pub fn new(
        handle: TransactionHandle,
        status: ReceiptStatus,
        logs: Vec<LogEntry>,
        block_number: u64,
    ) -> Self {
        Self {
            handle,
            status,
            logs,
            block_number,
        }
    }

    #[must_use]
    pub const fn handle(&self) -> TransactionHandle {
        self.handle
    }

    #[must_use]
    pub const fn status(&self) -> &ReceiptStatus {
        &self.status
    }

    #[must_use]
    pub fn is_included(&self) -> bool {
        matches!(self.status, ReceiptStatus::Included)
    }

    /// Emitted logs in ledger emission order.
    #[must_use]
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    #[must_use]
    pub const fn block_number(&self) -> u64 {
        self.block_number
    }
}
