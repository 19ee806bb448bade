//! Hedge-Action & Event Timeline
//!
//! The append-only log of reference points every other component timestamps
//! against. Events are get-or-create idempotent; hedge actions anchor one
//! hedging cycle to exactly one event.

pub mod errors;
pub mod event;
pub mod hedge_action;
pub mod repository;

pub use errors::TimelineError;
pub use event::{CompanyEvent, SnapshotKind};
pub use hedge_action::HedgeAction;
pub use repository::{EventTimeline, RangeBounds};
