//! Domain identifier types.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Identifier of a tokenized asset (the NFT token id).
///
/// The inner value is private so construction always goes through the
/// conversions below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(U256);

impl AssetId {
    /// Create an `AssetId` from the raw token id.
    #[must_use]
    pub const fn new(id: U256) -> Self {
        Self(id)
    }

    /// The raw token id as used in contract calls.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<U256> for AssetId {
    fn from(id: U256) -> Self {
        Self(id)
    }
}

impl From<u64> for AssetId {
    fn from(id: u64) -> Self {
        Self(U256::from(id))
    }
}

impl From<AssetId> for U256 {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl FromStr for AssetId {
    type Err = alloy_primitives::ruint::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s.trim(), 10).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_token_ids() {
        let id: AssetId = "42".parse().unwrap();
        assert_eq!(id, AssetId::from(42u64));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_garbage() {
        assert!("forty-two".parse::<AssetId>().is_err());
    }
}
