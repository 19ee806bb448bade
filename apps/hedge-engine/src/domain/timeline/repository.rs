//! Event Timeline Trait
//!
//! Defines the persistence abstraction for the company event timeline.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::errors::TimelineError;
use super::event::{CompanyEvent, SnapshotKind};
use super::hedge_action::HedgeAction;
use crate::domain::shared::{CompanyId, EventId, HedgeActionId, Timestamp};

/// Inclusive/exclusive bound selection for range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    /// Whether the lower bound is inclusive.
    pub lower_inclusive: bool,
    /// Whether the upper bound is inclusive.
    pub upper_inclusive: bool,
}

impl Default for RangeBounds {
    fn default() -> Self {
        Self {
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }
}

/// Repository trait for the company event timeline.
///
/// The get-or-create contract is the load-bearing piece: for a given
/// (company, time), exactly one event is ever created no matter how many
/// callers race; losers observe the winner's row.
#[async_trait]
pub trait EventTimeline: Send + Sync {
    /// Get the event for (company, time), creating it with all flags unset
    /// if it does not exist. Safe under concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn get_or_create_event(
        &self,
        company: &CompanyId,
        time: Timestamp,
    ) -> Result<CompanyEvent, TimelineError>;

    /// Find the event for (company, time) if one exists.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn find_event(
        &self,
        company: &CompanyId,
        time: Timestamp,
    ) -> Result<Option<CompanyEvent>, TimelineError>;

    /// Mark a snapshot flag on an event. Monotonic: flags never reset.
    ///
    /// # Errors
    ///
    /// Returns error if the event does not exist.
    async fn mark_event(&self, event: &EventId, kind: SnapshotKind) -> Result<(), TimelineError>;

    /// All events for a company between the optional bounds, in timeline
    /// order (time, then insertion order).
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn events_in_range(
        &self,
        company: &CompanyId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        bounds: RangeBounds,
    ) -> Result<Vec<CompanyEvent>, TimelineError>;

    /// The latest event for a company at or before `time` (or the latest
    /// overall when `time` is `None`).
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn latest_event(
        &self,
        company: &CompanyId,
        time: Option<Timestamp>,
    ) -> Result<Option<CompanyEvent>, TimelineError>;

    /// The latest event at or before `time` carrying the given snapshot
    /// kind. Used to find the last reconciled positions.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn latest_event_with(
        &self,
        company: &CompanyId,
        kind: SnapshotKind,
        time: Option<Timestamp>,
    ) -> Result<Option<CompanyEvent>, TimelineError>;

    /// Create a hedge action for (company, time): gets or creates the event,
    /// marks its hedge-action flag, and records the action.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn create_hedge_action(
        &self,
        company: &CompanyId,
        time: Timestamp,
    ) -> Result<HedgeAction, TimelineError>;

    /// Find a hedge action by ID.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn find_hedge_action(
        &self,
        id: &HedgeActionId,
    ) -> Result<Option<HedgeAction>, TimelineError>;
}
