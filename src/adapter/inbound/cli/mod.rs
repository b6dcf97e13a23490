//! CLI module graph.

pub mod activity;
pub mod asset;
pub mod check;
pub mod command;
pub mod identity;
pub mod loan;
pub mod operator;
pub mod output;
pub mod price;
pub mod receipt;
pub mod run;
pub mod sale;
