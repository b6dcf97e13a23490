//! Typed business events decoded from ledger logs.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::activity::ActivityPoints;
use super::id::AssetId;
use super::money::Money;

/// Selector for a [`DomainEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ActivityCalculated,
    SaleCreated,
    SaleCancelled,
    NftPurchased,
    LoanRequested,
    LoanFunded,
    LoanRepaid,
    LoanLiquidated,
    LoanCancelled,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActivityCalculated => "ActivityCalculated",
            Self::SaleCreated => "SaleCreated",
            Self::SaleCancelled => "SaleCancelled",
            Self::NftPurchased => "NFTPurchased",
            Self::LoanRequested => "LoanRequested",
            Self::LoanFunded => "LoanFunded",
            Self::LoanRepaid => "LoanRepaid",
            Self::LoanLiquidated => "LoanLiquidated",
            Self::LoanCancelled => "LoanCancelled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded, typed log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    ActivityCalculated(ActivityPoints),
    SaleCreated {
        asset_id: AssetId,
        seller: Address,
        price_usd: Money,
    },
    SaleCancelled {
        asset_id: AssetId,
        seller: Address,
    },
    NftPurchased {
        asset_id: AssetId,
        buyer: Address,
        seller: Address,
        price_native: Money,
    },
    LoanRequested {
        asset_id: AssetId,
        borrower: Address,
        principal_usd: Money,
        duration_days: u64,
    },
    LoanFunded {
        asset_id: AssetId,
        lender: Address,
        principal_native: Money,
        deadline: u64,
    },
    LoanRepaid {
        asset_id: AssetId,
        borrower: Address,
        amount_native: Money,
    },
    LoanLiquidated {
        asset_id: AssetId,
        lender: Address,
    },
    LoanCancelled {
        asset_id: AssetId,
        borrower: Address,
    },
}

impl DomainEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ActivityCalculated(_) => EventKind::ActivityCalculated,
            Self::SaleCreated { .. } => EventKind::SaleCreated,
            Self::SaleCancelled { .. } => EventKind::SaleCancelled,
            Self::NftPurchased { .. } => EventKind::NftPurchased,
            Self::LoanRequested { .. } => EventKind::LoanRequested,
            Self::LoanFunded { .. } => EventKind::LoanFunded,
            Self::LoanRepaid { .. } => EventKind::LoanRepaid,
            Self::LoanLiquidated { .. } => EventKind::LoanLiquidated,
            Self::LoanCancelled { .. } => EventKind::LoanCancelled,
        }
    }

    /// The asset the event is about, if it concerns a single asset.
    #[must_use]
    pub const fn asset_id(&self) -> Option<AssetId> {
        match self {
            Self::ActivityCalculated(_) => None,
            Self::SaleCreated { asset_id, .. }
            | Self::SaleCancelled { asset_id, .. }
            | Self::NftPurchased { asset_id, .. }
            | Self::LoanRequested { asset_id, .. }
            | Self::LoanFunded { asset_id, .. }
            | Self::LoanRepaid { asset_id, .. }
            | Self::LoanLiquidated { asset_id, .. }
            | Self::LoanCancelled { asset_id, .. } => Some(*asset_id),
        }
    }

    /// False when the event was emitted with an empty payload.
    ///
    /// Only asynchronous computations publish hollow events; everything
    /// else always carries its payload.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        match self {
            Self::ActivityCalculated(points) => !points.is_empty(),
            _ => true,
        }
    }

    /// The activity payload, if this is an `ActivityCalculated` event.
    #[must_use]
    pub fn into_activity(self) -> Option<ActivityPoints> {
        match self {
            Self::ActivityCalculated(points) => Some(points),
            _ => None,
        }
    }
}
