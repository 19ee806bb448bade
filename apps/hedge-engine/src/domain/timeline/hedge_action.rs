//! Hedge actions.
//!
//! A hedge action represents one cycle of a company recalculating and
//! submitting its net FX demand. Every desired position and order ticket
//! produced by a cycle is parented by the cycle's hedge action, and each
//! hedge action is anchored 1:1 to a timeline event.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{CompanyId, EventId, HedgeActionId, Timestamp};

/// One hedging cycle for a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeAction {
    id: HedgeActionId,
    company: CompanyId,
    event: EventId,
    time: Timestamp,
}

impl HedgeAction {
    /// Create a hedge action anchored to an existing event.
    #[must_use]
    pub fn new(company: CompanyId, event: EventId, time: Timestamp) -> Self {
        Self {
            id: HedgeActionId::generate(),
            company,
            event,
            time,
        }
    }

    /// Get the hedge action ID.
    #[must_use]
    pub const fn id(&self) -> &HedgeActionId {
        &self.id
    }

    /// Get the owning company.
    #[must_use]
    pub const fn company(&self) -> &CompanyId {
        &self.company
    }

    /// Get the anchoring event.
    #[must_use]
    pub const fn event(&self) -> &EventId {
        &self.event
    }

    /// Get the reference time of the cycle.
    #[must_use]
    pub const fn time(&self) -> Timestamp {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hedge_action_links_company_and_event() {
        let event = EventId::new("evt-1");
        let action = HedgeAction::new(
            CompanyId::new("co-1"),
            event.clone(),
            Timestamp::parse("2024-06-03T17:00:00Z").unwrap(),
        );
        assert_eq!(action.event(), &event);
        assert_eq!(action.company().as_str(), "co-1");
    }

    #[test]
    fn ids_are_unique_per_action() {
        let a = HedgeAction::new(CompanyId::new("co-1"), EventId::new("e"), Timestamp::now());
        let b = HedgeAction::new(CompanyId::new("co-1"), EventId::new("e"), Timestamp::now());
        assert_ne!(a.id(), b.id());
    }
}
