//! Concrete operator installed by the binary.

/// Operator backed by the TOML configuration and the EVM ledger adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Operator;
