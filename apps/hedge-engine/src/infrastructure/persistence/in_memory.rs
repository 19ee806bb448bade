//! In-memory persistence adapters.
//!
//! Suitable for testing and development. Not for production use.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::shared::{CompanyId, EventId, HedgeActionId, TicketId, Timestamp};
use crate::domain::tickets::{OrderTicket, TicketError, TicketRepository};
use crate::domain::timeline::{
    CompanyEvent, EventTimeline, HedgeAction, RangeBounds, SnapshotKind, TimelineError,
};

#[derive(Debug, Default)]
struct TimelineState {
    events: HashMap<EventId, CompanyEvent>,
    by_key: HashMap<(CompanyId, Timestamp), EventId>,
    actions: HashMap<HedgeActionId, HedgeAction>,
    next_seq: u64,
}

/// In-memory implementation of `EventTimeline`.
///
/// One lock guards the whole timeline, which makes get-or-create a single
/// atomic check-and-insert: concurrent callers for the same (company, time)
/// race on the lock and the losers observe the winner's event.
#[derive(Debug, Default)]
pub struct InMemoryEventTimeline {
    state: RwLock<TimelineState>,
}

impl InMemoryEventTimeline {
    /// Create a new empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    /// Whether the timeline is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventTimeline for InMemoryEventTimeline {
    async fn get_or_create_event(
        &self,
        company: &CompanyId,
        time: Timestamp,
    ) -> Result<CompanyEvent, TimelineError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let key = (company.clone(), time);
        if let Some(id) = state.by_key.get(&key) {
            let id = id.clone();
            return Ok(state.events[&id].clone());
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        let event = CompanyEvent::new(company.clone(), time, seq);
        state.by_key.insert(key, event.id().clone());
        state.events.insert(event.id().clone(), event.clone());
        Ok(event)
    }

    async fn find_event(
        &self,
        company: &CompanyId,
        time: Timestamp,
    ) -> Result<Option<CompanyEvent>, TimelineError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .by_key
            .get(&(company.clone(), time))
            .and_then(|id| state.events.get(id))
            .cloned())
    }

    async fn mark_event(&self, event: &EventId, kind: SnapshotKind) -> Result<(), TimelineError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let entry = state
            .events
            .get_mut(event)
            .ok_or_else(|| TimelineError::EventNotFound {
                event_id: event.to_string(),
            })?;
        entry.mark(kind);
        Ok(())
    }

    async fn events_in_range(
        &self,
        company: &CompanyId,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        bounds: RangeBounds,
    ) -> Result<Vec<CompanyEvent>, TimelineError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut events: Vec<CompanyEvent> = state
            .events
            .values()
            .filter(|e| e.company() == company)
            .filter(|e| {
                start.is_none_or(|s| {
                    if bounds.lower_inclusive {
                        e.time() >= s
                    } else {
                        e.time() > s
                    }
                })
            })
            .filter(|e| {
                end.is_none_or(|s| {
                    if bounds.upper_inclusive {
                        e.time() <= s
                    } else {
                        e.time() < s
                    }
                })
            })
            .cloned()
            .collect();
        events.sort_by_key(CompanyEvent::timeline_key);
        Ok(events)
    }

    async fn latest_event(
        &self,
        company: &CompanyId,
        time: Option<Timestamp>,
    ) -> Result<Option<CompanyEvent>, TimelineError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .events
            .values()
            .filter(|e| e.company() == company)
            .filter(|e| time.is_none_or(|t| e.time() <= t))
            .max_by_key(|e| e.timeline_key())
            .cloned())
    }

    async fn latest_event_with(
        &self,
        company: &CompanyId,
        kind: SnapshotKind,
        time: Option<Timestamp>,
    ) -> Result<Option<CompanyEvent>, TimelineError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .events
            .values()
            .filter(|e| e.company() == company && e.has(kind))
            .filter(|e| time.is_none_or(|t| e.time() <= t))
            .max_by_key(|e| e.timeline_key())
            .cloned())
    }

    async fn create_hedge_action(
        &self,
        company: &CompanyId,
        time: Timestamp,
    ) -> Result<HedgeAction, TimelineError> {
        let event = self.get_or_create_event(company, time).await?;
        self.mark_event(event.id(), SnapshotKind::HedgeAction).await?;
        let action = HedgeAction::new(company.clone(), event.id().clone(), time);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.actions.insert(action.id().clone(), action.clone());
        Ok(action)
    }

    async fn find_hedge_action(
        &self,
        id: &HedgeActionId,
    ) -> Result<Option<HedgeAction>, TimelineError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.actions.get(id).cloned())
    }
}

/// In-memory implementation of `TicketRepository`.
#[derive(Debug, Default)]
pub struct InMemoryTicketRepository {
    tickets: RwLock<HashMap<TicketId, OrderTicket>>,
}

impl InMemoryTicketRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn save(&self, ticket: &OrderTicket) -> Result<(), TicketError> {
        let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
        tickets.insert(ticket.id().clone(), ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<OrderTicket>, TicketError> {
        let tickets = self.tickets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tickets.get(id).cloned())
    }

    async fn find_open(&self) -> Result<Vec<OrderTicket>, TicketError> {
        let tickets = self.tickets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tickets
            .values()
            .filter(|t| !t.internal_state().is_terminal())
            .cloned()
            .collect())
    }

    async fn find_open_for_company(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<OrderTicket>, TicketError> {
        let tickets = self.tickets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tickets
            .values()
            .filter(|t| t.company() == company && !t.internal_state().is_terminal())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn company() -> CompanyId {
        CompanyId::new("co-1")
    }

    fn t(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let timeline = InMemoryEventTimeline::new();
        let first = timeline
            .get_or_create_event(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap();
        let second = timeline
            .get_or_create_event(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(timeline.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_get_or_create_yields_one_event() {
        let timeline = Arc::new(InMemoryEventTimeline::new());
        let time = t("2024-06-03T17:00:00Z");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let timeline = Arc::clone(&timeline);
            handles.push(tokio::spawn(async move {
                timeline.get_or_create_event(&company(), time).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id().clone());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(timeline.len(), 1);
    }

    #[tokio::test]
    async fn events_order_by_time_then_insertion() {
        let timeline = InMemoryEventTimeline::new();
        let late = timeline
            .get_or_create_event(&company(), t("2024-06-03T18:00:00Z"))
            .await
            .unwrap();
        let early = timeline
            .get_or_create_event(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap();

        let events = timeline
            .events_in_range(&company(), None, None, RangeBounds::default())
            .await
            .unwrap();
        assert_eq!(events[0].id(), early.id());
        assert_eq!(events[1].id(), late.id());
    }

    #[tokio::test]
    async fn range_bounds_are_honored() {
        let timeline = InMemoryEventTimeline::new();
        timeline
            .get_or_create_event(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap();
        timeline
            .get_or_create_event(&company(), t("2024-06-03T18:00:00Z"))
            .await
            .unwrap();

        let exclusive = timeline
            .events_in_range(
                &company(),
                Some(t("2024-06-03T17:00:00Z")),
                Some(t("2024-06-03T18:00:00Z")),
                RangeBounds {
                    lower_inclusive: false,
                    upper_inclusive: false,
                },
            )
            .await
            .unwrap();
        assert!(exclusive.is_empty());

        let inclusive = timeline
            .events_in_range(
                &company(),
                Some(t("2024-06-03T17:00:00Z")),
                Some(t("2024-06-03T18:00:00Z")),
                RangeBounds::default(),
            )
            .await
            .unwrap();
        assert_eq!(inclusive.len(), 2);
    }

    #[tokio::test]
    async fn latest_event_with_filters_by_snapshot_kind() {
        let timeline = InMemoryEventTimeline::new();
        let first = timeline
            .get_or_create_event(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap();
        timeline
            .get_or_create_event(&company(), t("2024-06-03T18:00:00Z"))
            .await
            .unwrap();
        timeline
            .mark_event(first.id(), SnapshotKind::AccountFx)
            .await
            .unwrap();

        let found = timeline
            .latest_event_with(&company(), SnapshotKind::AccountFx, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), first.id());

        let none = timeline
            .latest_event_with(&company(), SnapshotKind::CompanyFx, None)
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn hedge_action_marks_its_event() {
        let timeline = InMemoryEventTimeline::new();
        let action = timeline
            .create_hedge_action(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap();

        let event = timeline
            .find_event(&company(), t("2024-06-03T17:00:00Z"))
            .await
            .unwrap()
            .unwrap();
        assert!(event.has(SnapshotKind::HedgeAction));
        assert_eq!(event.id(), action.event());

        let found = timeline.find_hedge_action(action.id()).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn closed_tickets_are_not_open() {
        let repo = InMemoryTicketRepository::new();
        let mut ticket = OrderTicket::new(
            company(),
            crate::domain::shared::FxPair::new("EUR", "USD"),
            HedgeActionId::new("ha-1"),
            rust_decimal_macros::dec!(1000),
            t("2024-06-03T17:00:00Z"),
        );
        repo.save(&ticket).await.unwrap();
        assert_eq!(repo.find_open().await.unwrap().len(), 1);

        ticket.request_cancel().unwrap();
        ticket.acknowledge_cancel().unwrap();
        repo.save(&ticket).await.unwrap();
        assert!(repo.find_open().await.unwrap().is_empty());
    }
}
