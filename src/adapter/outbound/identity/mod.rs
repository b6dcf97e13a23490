//! Identity directory adapters.

pub mod memory;
pub mod rest;
