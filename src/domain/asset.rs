//! Tokenized asset views.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::id::AssetId;
use super::receipt::Receipt;

/// Result of minting an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintOutcome {
    pub receipt: Receipt,
    /// Token id from the mint `Transfer` log, when the receipt carried one.
    pub asset_id: Option<AssetId>,
}

/// Ownership and metadata pointer of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub asset_id: AssetId,
    pub owner: Address,
    pub uri: String,
}

/// Addresses the marketplace contract reports for its collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub nft: Address,
    pub lending: Address,
    pub price_feed: Address,
}

/// Collection-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub symbol: String,
    pub total_minted: u64,
}
