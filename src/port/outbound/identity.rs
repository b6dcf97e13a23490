//! Identity directory port.
//!
//! Associates an external handle (a social username) with wallet addresses.
//! The directory lives off the ledger.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::error::Result;

/// Lookup and registration of handle to wallet associations.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Wallets registered for `handle`. Empty when none are.
    async fn lookup(&self, handle: &str) -> Result<Vec<Address>>;

    /// The handle registered for `address`, if any.
    async fn reverse_lookup(&self, address: Address) -> Result<Option<String>>;

    /// Register `address` under `handle`, replacing an earlier handle for
    /// the same address.
    async fn upsert(&self, handle: &str, address: Address) -> Result<()>;
}

/// Canonical form of a handle: no leading `@`, trimmed. Case is kept;
/// directory rows match handles exactly.
///
/// # Errors
///
/// Returns [`DomainError::EmptyHandle`] when nothing is left.
pub fn normalize_handle(handle: &str) -> std::result::Result<String, DomainError> {
    let trimmed = handle.trim();
    let bare = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if bare.is_empty() {
        return Err(DomainError::EmptyHandle);
    }
    Ok(bare.to_string())
}
