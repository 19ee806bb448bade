//! Domain Layer
//!
//! Pure business logic: entities, value objects, calculators and state
//! machines. No IO and no dependencies on outer layers.

pub mod liquidity;
pub mod positions;
pub mod reconciliation;
pub mod shared;
pub mod tickets;
pub mod timeline;
