//! Persistence Adapters
//!
//! Implementations of the timeline and ticket repository traits.

pub mod in_memory;
pub mod reconciliation_store;

pub use in_memory::{InMemoryEventTimeline, InMemoryTicketRepository};
pub use reconciliation_store::InMemoryReconciliationStore;
