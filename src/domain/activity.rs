//! Activity-point computation results.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::receipt::TransactionHandle;

/// Wallets linked to an identifier and their activity points.
///
/// `points[i]` belongs to `wallets[i]`; a missing point counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoints {
    pub wallets: Vec<Address>,
    pub points: Vec<U256>,
}

impl ActivityPoints {
    #[must_use]
    pub fn new(wallets: Vec<Address>, points: Vec<U256>) -> Self {
        Self { wallets, points }
    }

    /// True when the computation reported neither wallets nor points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty() && self.points.is_empty()
    }

    /// Pair each wallet with its points.
    pub fn entries(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.wallets
            .iter()
            .enumerate()
            .map(|(i, w)| (*w, self.points.get(i).copied().unwrap_or_default()))
    }

    /// Sum of all reported points.
    #[must_use]
    pub fn total(&self) -> U256 {
        self.points
            .iter()
            .fold(U256::ZERO, |acc, p| acc.saturating_add(*p))
    }
}

/// Outcome of an activity request.
///
/// `results` is `None` when the request was accepted but the computation
/// had not published a populated result before polling gave up. That is a
/// pending state, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityResult {
    pub handle: TransactionHandle,
    pub from: Option<Address>,
    pub to: Address,
    pub identifier: String,
    pub block_number: u64,
    pub results: Option<ActivityPoints>,
}

impl ActivityResult {
    /// True once a populated result has been observed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.results.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn missing_points_default_to_zero() {
        let points = ActivityPoints::new(
            vec![
                address!("00000000000000000000000000000000000000a1"),
                address!("00000000000000000000000000000000000000a2"),
            ],
            vec![U256::from(42u64)],
        );
        let entries: Vec<_> = points.entries().collect();
        assert_eq!(entries[0].1, U256::from(42u64));
        assert_eq!(entries[1].1, U256::ZERO);
        assert_eq!(points.total(), U256::from(42u64));
    }

    #[test]
    fn empty_result_has_no_payload() {
        assert!(ActivityPoints::default().is_empty());
        assert!(!ActivityPoints::new(vec![], vec![U256::from(1u64)]).is_empty());
    }
}
