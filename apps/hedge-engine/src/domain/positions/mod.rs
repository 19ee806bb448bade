//! Positions & Snapshot History
//!
//! Per-account FX positions with derived PnL, and the doubly-linked
//! snapshot chain recording their history.

pub mod chain;
pub mod errors;
pub mod fx_position;

pub use chain::{PositionSnapshot, SnapshotChainStore};
pub use errors::PositionError;
pub use fx_position::FxPosition;
