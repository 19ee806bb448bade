//! Order ticket aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::TicketError;
use super::states::{ExecutionStatus, ExecutionStrategy, FundingModel, InternalState, Phase};
use crate::domain::shared::{CompanyId, FxPair, HedgeActionId, TicketId, Timestamp, VenueOrderId};

/// One order-execution intent moving through the authorization, funding and
/// execution lifecycle.
///
/// The aggregate holds its own state but never advances itself: the cycle
/// driver inspects it each sweep and applies transitions. Commands here
/// (authorize, pause, cancel) are the external signals that arrive between
/// sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTicket {
    id: TicketId,
    company: CompanyId,
    fx_pair: FxPair,
    hedge_action: HedgeActionId,
    /// Signed amount: positive buys the base currency.
    amount: Decimal,
    destination: Option<String>,
    venue_order_id: Option<VenueOrderId>,
    internal_state: InternalState,
    phase: Phase,
    strategy: Option<ExecutionStrategy>,
    execution_status: Option<ExecutionStatus>,
    funding: Option<FundingModel>,
    auth_user: Option<String>,
    auth_time: Option<Timestamp>,
    upper_trigger: Option<Decimal>,
    lower_trigger: Option<Decimal>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    paused: bool,
    error: Option<String>,
    created_at: Timestamp,
}

impl OrderTicket {
    /// Create a new ticket in `NEW`/`IDLE`.
    #[must_use]
    pub fn new(
        company: CompanyId,
        fx_pair: FxPair,
        hedge_action: HedgeActionId,
        amount: Decimal,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: TicketId::generate(),
            company,
            fx_pair,
            hedge_action,
            amount,
            destination: None,
            venue_order_id: None,
            internal_state: InternalState::New,
            phase: Phase::Idle,
            strategy: None,
            execution_status: None,
            funding: None,
            auth_user: None,
            auth_time: None,
            upper_trigger: None,
            lower_trigger: None,
            start_time: None,
            end_time: None,
            paused: false,
            error: None,
            created_at,
        }
    }

    /// Get the ticket ID.
    #[must_use]
    pub const fn id(&self) -> &TicketId {
        &self.id
    }

    /// Get the owning company.
    #[must_use]
    pub const fn company(&self) -> &CompanyId {
        &self.company
    }

    /// Get the currency pair.
    #[must_use]
    pub const fn fx_pair(&self) -> &FxPair {
        &self.fx_pair
    }

    /// Get the originating hedge action.
    #[must_use]
    pub const fn hedge_action(&self) -> &HedgeActionId {
        &self.hedge_action
    }

    /// Get the signed order amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the destination venue, if routed.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Get the venue's order ID, once submitted.
    #[must_use]
    pub const fn venue_order_id(&self) -> Option<&VenueOrderId> {
        self.venue_order_id.as_ref()
    }

    /// Get the internal state.
    #[must_use]
    pub const fn internal_state(&self) -> InternalState {
        self.internal_state
    }

    /// Get the venue phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Get the execution strategy, if set.
    #[must_use]
    pub const fn strategy(&self) -> Option<ExecutionStrategy> {
        self.strategy
    }

    /// Get the delegated-execution status, if any.
    #[must_use]
    pub const fn execution_status(&self) -> Option<ExecutionStatus> {
        self.execution_status
    }

    /// Get the funding model, if set.
    #[must_use]
    pub const fn funding(&self) -> Option<FundingModel> {
        self.funding
    }

    /// Get the authorizing user, if authorized.
    #[must_use]
    pub fn auth_user(&self) -> Option<&str> {
        self.auth_user.as_deref()
    }

    /// Get the authorization time, if authorized.
    #[must_use]
    pub const fn auth_time(&self) -> Option<Timestamp> {
        self.auth_time
    }

    /// Get the upper price trigger, if configured.
    #[must_use]
    pub const fn upper_trigger(&self) -> Option<Decimal> {
        self.upper_trigger
    }

    /// Get the lower price trigger, if configured.
    #[must_use]
    pub const fn lower_trigger(&self) -> Option<Decimal> {
        self.lower_trigger
    }

    /// Get the earliest execution time, if scheduled.
    #[must_use]
    pub const fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    /// Get the expiry time, if set.
    #[must_use]
    pub const fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    /// Whether the ticket is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get the recorded error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Get the creation time.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether any trigger is configured.
    #[must_use]
    pub const fn has_trigger(&self) -> bool {
        self.upper_trigger.is_some() || self.lower_trigger.is_some()
    }

    /// Whether the ticket is past its expiry time.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.end_time.is_some_and(|end| now >= end)
    }

    /// Set the destination venue.
    pub fn route_to(&mut self, destination: impl Into<String>) {
        self.destination = Some(destination.into());
    }

    /// Record the ID the venue assigned on submission.
    pub fn set_venue_order_id(&mut self, id: VenueOrderId) {
        self.venue_order_id = Some(id);
    }

    /// Set the execution strategy.
    pub fn set_strategy(&mut self, strategy: ExecutionStrategy) {
        self.strategy = Some(strategy);
    }

    /// Set the funding model.
    pub fn set_funding(&mut self, funding: FundingModel) {
        self.funding = Some(funding);
    }

    /// Configure price triggers.
    pub fn set_triggers(&mut self, upper: Option<Decimal>, lower: Option<Decimal>) {
        self.upper_trigger = upper;
        self.lower_trigger = lower;
    }

    /// Set the execution window.
    pub fn set_window(&mut self, start: Option<Timestamp>, end: Option<Timestamp>) {
        self.start_time = start;
        self.end_time = end;
    }

    /// Record the delegated-execution status.
    pub fn set_execution_status(&mut self, status: ExecutionStatus) {
        self.execution_status = Some(status);
    }

    /// Record an error on the ticket without changing its state.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Authorize the ticket. Only meaningful in `PENDAUTH`; the driver picks
    /// the authorization up on its next sweep.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket is not awaiting authorization.
    pub fn authorize(&mut self, user: impl Into<String>, now: Timestamp) -> Result<(), TicketError> {
        if self.internal_state != InternalState::PendAuth {
            return Err(TicketError::InvalidStateTransition {
                from: self.internal_state,
                to: self.internal_state,
                reason: "authorization only applies to PENDAUTH tickets".to_owned(),
            });
        }
        self.auth_user = Some(user.into());
        self.auth_time = Some(now);
        Ok(())
    }

    /// Pause the ticket. Paused tickets are skipped by the driver.
    ///
    /// # Errors
    ///
    /// Returns error if already paused or too late to pause.
    pub fn pause(&mut self) -> Result<(), TicketError> {
        if self.paused {
            return Err(TicketError::AlreadyPaused);
        }
        if !self.internal_state.is_pauseable() {
            return Err(TicketError::CannotPause {
                state: self.internal_state,
            });
        }
        self.paused = true;
        Ok(())
    }

    /// Resume a paused ticket.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket is not paused.
    pub fn resume(&mut self) -> Result<(), TicketError> {
        if !self.paused {
            return Err(TicketError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Request cancellation. Moves any cancellable ticket to `PENDCANCEL`
    /// immediately, outside the driver's transition table.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket is already cancelling or closed.
    pub fn request_cancel(&mut self) -> Result<(), TicketError> {
        if !self.internal_state.is_cancellable() {
            return Err(TicketError::CannotCancel {
                state: self.internal_state,
            });
        }
        self.internal_state = InternalState::PendCancel;
        Ok(())
    }

    /// Acknowledge a destination cancel: `PENDCANCEL` becomes `CLOSED` and
    /// the ticket leaves the venue.
    ///
    /// # Errors
    ///
    /// Returns error if the ticket is not awaiting a cancel ack.
    pub fn acknowledge_cancel(&mut self) -> Result<(), TicketError> {
        if self.internal_state != InternalState::PendCancel {
            return Err(TicketError::InvalidStateTransition {
                from: self.internal_state,
                to: InternalState::Closed,
                reason: "only PENDCANCEL tickets can acknowledge a cancel".to_owned(),
            });
        }
        self.internal_state = InternalState::Closed;
        self.phase = Phase::Idle;
        Ok(())
    }

    pub(crate) fn set_internal_state(&mut self, state: InternalState) {
        self.internal_state = state;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticket() -> OrderTicket {
        OrderTicket::new(
            CompanyId::new("co-1"),
            FxPair::new("EUR", "USD"),
            HedgeActionId::new("ha-1"),
            dec!(100000),
            Timestamp::parse("2024-06-03T17:00:00Z").unwrap(),
        )
    }

    #[test]
    fn new_ticket_starts_idle_and_unrouted() {
        let t = ticket();
        assert_eq!(t.internal_state(), InternalState::New);
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.destination(), None);
        assert!(!t.is_paused());
    }

    #[test]
    fn authorize_requires_pendauth() {
        let mut t = ticket();
        let err = t.authorize("ops", Timestamp::now()).unwrap_err();
        assert!(matches!(err, TicketError::InvalidStateTransition { .. }));

        t.set_internal_state(InternalState::PendAuth);
        t.authorize("ops", Timestamp::now()).unwrap();
        assert_eq!(t.auth_user(), Some("ops"));
        assert!(t.auth_time().is_some());
    }

    #[test]
    fn pause_rejected_once_accepted() {
        let mut t = ticket();
        t.set_internal_state(InternalState::Accepted);
        assert!(matches!(
            t.pause(),
            Err(TicketError::CannotPause { state: InternalState::Accepted })
        ));
    }

    #[test]
    fn pause_and_resume_round_trip() {
        let mut t = ticket();
        t.pause().unwrap();
        assert!(t.is_paused());
        assert!(matches!(t.pause(), Err(TicketError::AlreadyPaused)));
        t.resume().unwrap();
        assert!(!t.is_paused());
        assert!(matches!(t.resume(), Err(TicketError::NotPaused)));
    }

    #[test]
    fn cancel_is_orthogonal_to_state() {
        for state in [
            InternalState::New,
            InternalState::PendAuth,
            InternalState::Scheduled,
            InternalState::Waiting,
            InternalState::Accepted,
        ] {
            let mut t = ticket();
            t.set_internal_state(state);
            t.request_cancel().unwrap();
            assert_eq!(t.internal_state(), InternalState::PendCancel);
        }
    }

    #[test]
    fn cancel_rejected_when_closed() {
        let mut t = ticket();
        t.set_internal_state(InternalState::Closed);
        assert!(matches!(
            t.request_cancel(),
            Err(TicketError::CannotCancel { .. })
        ));
    }

    #[test]
    fn cancel_ack_closes_and_goes_idle() {
        let mut t = ticket();
        t.set_internal_state(InternalState::PendCancel);
        t.set_phase(Phase::Working);
        t.acknowledge_cancel().unwrap();
        assert_eq!(t.internal_state(), InternalState::Closed);
        assert_eq!(t.phase(), Phase::Idle);
    }

    #[test]
    fn expiry_uses_end_time() {
        let mut t = ticket();
        assert!(!t.is_expired(Timestamp::now()));
        let end = Timestamp::parse("2024-06-03T18:00:00Z").unwrap();
        t.set_window(None, Some(end));
        assert!(t.is_expired(Timestamp::parse("2024-06-03T18:00:01Z").unwrap()));
        assert!(!t.is_expired(Timestamp::parse("2024-06-03T17:59:59Z").unwrap()));
    }
}
