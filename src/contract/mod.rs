//! Contract interfaces and the event schema.
//!
//! Call encoding and log layouts are declared with `sol!`; nothing else in
//! the crate hand-builds calldata.

pub mod activity;
pub mod call;
pub mod marketplace;
pub mod schema;
