//! nftlend: on-chain orchestration of NFT sales, collateralized loans and
//! activity-point requests.
//!
//! The crate drives a marketplace contract that lists assets for sale in
//! USD, settles purchases in the native asset at the price feed's current
//! rate, and lends native funds against assets held as collateral. A second
//! contract computes activity points off-ledger and publishes them as logs
//! some blocks after the request.
//!
//! # Architecture
//!
//! - [`domain`]: money, ids, sales, loans, receipts and typed events. No I/O.
//! - [`contract`]: `sol!` interfaces and the event schema that decodes logs.
//! - [`port`]: the [`Ledger`](port::outbound::ledger::Ledger) and
//!   identity directory interfaces, and the operator surface the CLI drives.
//! - [`application`]: the executor, event and polling resolvers, and the
//!   sale, loan, activity and asset services built on them.
//! - [`adapter`]: the EVM JSON-RPC ledger, identity directories and the CLI.
//! - [`infrastructure`]: configuration, logging and service wiring.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nftlend::adapter::outbound::evm::ledger::EvmLedger;
//! use nftlend::application::oracle::PriceOracle;
//!
//! # async fn run() -> nftlend::error::Result<()> {
//! let ledger = Arc::new(EvmLedger::connect("http://127.0.0.1:8545", None)?);
//! let marketplace = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
//! let rate = PriceOracle::new(ledger, marketplace).latest_price().await?;
//! println!("{rate}");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod contract;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
