//! Application Use Cases
//!
//! The engine's orchestration layer: each use case wires domain logic to
//! ports and owns one batch operation.

pub mod cycle_tickets;
pub mod plan_hedge;
pub mod reconcile;

pub use cycle_tickets::{CycleReport, CycleTicketsUseCase};
pub use plan_hedge::{HedgePlan, HedgePlanRequest, PlanHedgeUseCase};
pub use reconcile::{collect_venue_inputs, ReconcileUseCase};
