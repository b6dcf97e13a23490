use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::receipt::TransactionHandle;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures while talking to the ledger.
///
/// The variants are ordered by how far the operation got: a submission
/// failure means nothing reached the ledger, a timeout means the outcome is
/// unknown, and a revert means the ledger executed the call and rejected it.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    /// The signer or transport rejected the call before it was accepted.
    #[error("submission failed: {0}")]
    SubmissionFailure(String),

    /// The ledger executed the call and rejected it.
    ///
    /// `handle` is `None` when the node refused the call during submission
    /// (for example while estimating gas) and no transaction was broadcast.
    #[error("execution reverted: {reason}")]
    ExecutionReverted {
        reason: String,
        handle: Option<TransactionHandle>,
    },

    /// Inclusion was not observed in time. The same handle may be confirmed again.
    #[error("transaction {handle} not confirmed within {}s", waited.as_secs())]
    ConfirmationTimeout {
        handle: TransactionHandle,
        waited: Duration,
    },

    /// A read-only query failed.
    #[error("ledger read failed: {0}")]
    Read(String),

    /// Returned data did not match the contract interface.
    #[error("failed to decode ledger data: {0}")]
    Decode(String),
}

/// Coarse classification of a failure for callers deciding what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Rejected locally before any ledger interaction.
    Local,
    /// Nothing reached the ledger.
    NothingHappened,
    /// Submitted, but inclusion was not observed. Re-poll the handle.
    Unconfirmed,
    /// The ledger executed the operation and rejected it.
    FailedOnLedger,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Classify the failure by how far the operation progressed.
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Ledger(LedgerError::ExecutionReverted { .. }) => FailureCategory::FailedOnLedger,
            Self::Ledger(LedgerError::ConfirmationTimeout { .. }) => FailureCategory::Unconfirmed,
            Self::Config(_) | Self::Domain(_) | Self::Parse(_) => FailureCategory::Local,
            _ => FailureCategory::NothingHappened,
        }
    }

    /// True when a required setting was missing or invalid.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// The ledger-supplied reason when the ledger rejected the operation.
    #[must_use]
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Ledger(LedgerError::ExecutionReverted { reason, .. }) => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    #[test]
    fn revert_is_classified_as_failed_on_ledger() {
        let err = Error::from(LedgerError::ExecutionReverted {
            reason: "Sale not active".into(),
            handle: None,
        });
        assert_eq!(err.category(), FailureCategory::FailedOnLedger);
        assert_eq!(err.revert_reason(), Some("Sale not active"));
    }

    #[test]
    fn timeout_is_unconfirmed() {
        let err = Error::from(LedgerError::ConfirmationTimeout {
            handle: TransactionHandle::new(B256::ZERO),
            waited: Duration::from_secs(30),
        });
        assert_eq!(err.category(), FailureCategory::Unconfirmed);
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn missing_config_is_local() {
        let err = Error::from(ConfigError::MissingField {
            field: "contracts.marketplace",
        });
        assert!(err.is_configuration());
        assert_eq!(err.category(), FailureCategory::Local);
    }

    #[test]
    fn submission_failure_means_nothing_happened() {
        let err = Error::from(LedgerError::SubmissionFailure("nonce too low".into()));
        assert_eq!(err.category(), FailureCategory::NothingHappened);
        assert!(err.revert_reason().is_none());
    }
}
