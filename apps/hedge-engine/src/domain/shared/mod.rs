//! Shared Domain Types
//!
//! Value objects and errors shared across bounded contexts.

pub mod errors;
pub mod fx_pair;
pub mod identifiers;
pub mod timestamp;

pub use errors::DomainError;
pub use fx_pair::FxPair;
pub use identifiers::{
    AccountId, CompanyId, EventId, HedgeActionId, SnapshotId, TicketId, VenueOrderId,
};
pub use timestamp::Timestamp;
