//! Trait definitions (hexagonal ports).
//!
//! ```text
//!                 ┌─────────────────────────┐
//!     CLI ───────▶│      Application        │
//!   (inbound)     │   Domain + Port         ├───────────┐
//!     ┌───────────┤                         │           │
//!     ▼           └─────────────────────────┘           ▼
//! ┌──────────┐                                   ┌────────────┐
//! │  Ledger  │                                   │  Identity  │
//! │ (EVM RPC)│                                   │ (REST/mem) │
//! └──────────┘                                   └────────────┘
//! ```

pub mod inbound;
pub mod outbound;
