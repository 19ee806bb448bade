//! Broker Reconciliation
//!
//! Matches venue-reported truth (fills, balances) against internally
//! recorded expectations, producing final per-account positions, audit
//! records and hedge-request results. The calculator is pure; persistence
//! happens through the application layer's callback port.

pub mod calculator;
pub mod data;
pub mod fill;
pub mod record;
pub mod request;

pub use calculator::{ReconciliationCalculator, ReconciliationInputs, ReconciliationOutcome};
pub use data::ReconciliationData;
pub use fill::FxFillSummary;
pub use record::ReconciliationRecord;
pub use request::{AccountHedgeRequest, AccountHedgeResult, HedgeResultStatus};
