//! Sale snapshots read from the marketplace.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::id::AssetId;
use super::money::Money;

/// A fixed-USD-price listing of an asset.
///
/// At most one active sale exists per asset; the ledger enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub asset_id: AssetId,
    pub seller: Address,
    pub price_usd: Money,
    pub active: bool,
}

/// What a buyer pays for a sale right now.
///
/// `native` moves with the price feed; it is only valid as of the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleQuote {
    pub native: Money,
    pub usd: Money,
}

/// An active sale together with its current native price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleListing {
    pub sale: Sale,
    pub price_native: Money,
}
