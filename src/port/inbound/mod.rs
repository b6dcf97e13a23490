//! Inbound ports (driving side).

pub mod operator;
