//! Infrastructure: configuration, wiring and operator implementations.

pub mod bootstrap;
pub mod config;
pub mod operator;
