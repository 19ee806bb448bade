//! Liquidity Netting
//!
//! Offsets opposing accounts' desired positions against each other before
//! trading so only the company-level residual reaches the venue. Holds the
//! desired-position and pool-record types, the derived liquidity figures,
//! and the absorption redistribution algorithm.

pub mod adjust;
pub mod data;
pub mod desired_position;
pub mod pool;

pub use adjust::{cross_desired_positions, liquidity_adjusted_positions};
pub use data::LiquidityData;
pub use desired_position::DesiredPosition;
pub use pool::LiquidityPoolRecord;
