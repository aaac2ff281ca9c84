//! CLI command implementations.

pub mod ledger;
pub mod preview;
pub mod sync;
