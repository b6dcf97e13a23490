//! In-process identity directory.

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::port::outbound::identity::{normalize_handle, IdentityDirectory};

/// Directory held in memory. Each address maps to at most one handle.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    by_address: RwLock<HashMap<Address, String>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_address.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_address.read().is_empty()
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn lookup(&self, handle: &str) -> Result<Vec<Address>> {
        let handle = normalize_handle(handle)?;
        let mut wallets: Vec<Address> = self
            .by_address
            .read()
            .iter()
            .filter(|(_, h)| **h == handle)
            .map(|(a, _)| *a)
            .collect();
        wallets.sort();
        Ok(wallets)
    }

    async fn reverse_lookup(&self, address: Address) -> Result<Option<String>> {
        Ok(self.by_address.read().get(&address).cloned())
    }

    async fn upsert(&self, handle: &str, address: Address) -> Result<()> {
        let handle = normalize_handle(handle)?;
        self.by_address.write().insert(address, handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixture;

    #[tokio::test]
    async fn lookups_strip_at_and_match_case() {
        let directory = MemoryDirectory::new();
        directory.upsert("@Alice", fixture::ALICE).await.unwrap();
        directory.upsert("Alice", fixture::CAROL).await.unwrap();
        directory.upsert("alice", fixture::BOB).await.unwrap();

        let wallets = directory.lookup("@Alice").await.unwrap();
        assert_eq!(wallets.len(), 2);
        assert!(wallets.contains(&fixture::ALICE));
        assert!(!wallets.contains(&fixture::BOB));
        assert_eq!(directory.lookup("ALICE").await.unwrap(), Vec::<Address>::new());
        assert_eq!(
            directory.reverse_lookup(fixture::CAROL).await.unwrap(),
            Some("Alice".to_string())
        );
    }

    #[tokio::test]
    async fn upsert_replaces_handle_for_address() {
        let directory = MemoryDirectory::new();
        directory.upsert("bob", fixture::BOB).await.unwrap();
        directory.upsert("robert", fixture::BOB).await.unwrap();

        assert!(directory.lookup("bob").await.unwrap().is_empty());
        assert_eq!(directory.lookup("robert").await.unwrap(), vec![fixture::BOB]);
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn unknown_entries_are_empty() {
        let directory = MemoryDirectory::new();
        assert!(directory.lookup("nobody").await.unwrap().is_empty());
        assert_eq!(directory.reverse_lookup(fixture::ALICE).await.unwrap(), None);
        assert!(directory.upsert("@", fixture::ALICE).await.is_err());
    }
}
