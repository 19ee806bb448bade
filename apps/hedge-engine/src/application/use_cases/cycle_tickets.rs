//! Cycle Tickets Use Case
//!
//! The level-triggered ticket sweep. Every open ticket is re-evaluated
//! against the state machine each pass; expired tickets are cancelled, newly
//! accepted tickets are submitted to their venue. Per-ticket failures are
//! isolated and retried on the next sweep.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::ports::{MarketDataPort, VenuePort};
use crate::domain::shared::Timestamp;
use crate::domain::tickets::{
    CycleContext, Effect, ExecutionStrategy, InternalState, OrderTicket, Phase, TicketCycle,
    TicketRepository,
};

/// Summary of one sweep.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Tickets visited.
    pub visited: usize,
    /// Tickets that changed state.
    pub transitioned: usize,
    /// Tickets submitted to a venue this sweep.
    pub submitted: usize,
    /// Tickets cancelled for expiry.
    pub expired: usize,
    /// Per-ticket errors, skipped this sweep.
    pub errors: Vec<String>,
}

/// Use case driving all open tickets through one cycle.
pub struct CycleTicketsUseCase<R, M, V>
where
    R: TicketRepository,
    M: MarketDataPort,
    V: VenuePort,
{
    tickets: Arc<R>,
    market_data: Arc<M>,
    venue: Arc<V>,
}

impl<R, M, V> CycleTicketsUseCase<R, M, V>
where
    R: TicketRepository,
    M: MarketDataPort,
    V: VenuePort,
{
    /// Create a new `CycleTicketsUseCase`.
    pub fn new(tickets: Arc<R>, market_data: Arc<M>, venue: Arc<V>) -> Self {
        Self {
            tickets,
            market_data,
            venue,
        }
    }

    /// Sweep all open tickets once.
    pub async fn execute(&self, now: Timestamp) -> CycleReport {
        let mut report = CycleReport::default();

        let open = match self.tickets.find_open().await {
            Ok(tickets) => tickets,
            Err(e) => {
                report.errors.push(format!("failed to load tickets: {e}"));
                return report;
            }
        };

        debug!(count = open.len(), "cycling tickets");
        for ticket in open {
            report.visited += 1;
            let id = ticket.id().clone();
            if let Err(e) = self.cycle_ticket(ticket, now, &mut report).await {
                warn!(ticket = %id, error = %e, "ticket skipped this sweep");
                report.errors.push(format!("{id}: {e}"));
            }
        }

        report
    }

    async fn cycle_ticket(
        &self,
        mut ticket: OrderTicket,
        now: Timestamp,
        report: &mut CycleReport,
    ) -> anyhow::Result<()> {
        if ticket.is_paused() {
            return Ok(());
        }

        // Expiry wins over everything else a sweep might do.
        if ticket.internal_state().is_cancellable() && ticket.is_expired(now) {
            info!(ticket = %ticket.id(), "ticket expired, cancelling");
            ticket.request_cancel()?;
            if let Some(order_id) = ticket.venue_order_id() {
                self.venue.cancel(order_id).await?;
            }
            self.tickets.save(&ticket).await?;
            report.expired += 1;
            report.transitioned += 1;
            return Ok(());
        }

        let ctx = self.build_context(&ticket, now).await?;
        let before = ticket.internal_state();
        let transition = TicketCycle::evaluate(&ticket, &ctx);

        // Going live at the venue happens before the state is persisted, so
        // a submit failure leaves the ticket to be retried next sweep.
        if transition.effect == Effect::GoWorking && ticket.phase() == Phase::Idle {
            if ticket.destination().is_none() {
                ticket.set_error("no destination");
                self.tickets.save(&ticket).await?;
                anyhow::bail!("ticket has no destination");
            }
            let order_id = self.venue.submit(&ticket).await?;
            ticket.set_venue_order_id(order_id);
            report.submitted += 1;
        }

        TicketCycle::apply(&mut ticket, transition);
        if ticket.internal_state() != before {
            debug!(ticket = %ticket.id(), from = %before, to = %ticket.internal_state(),
                "ticket transitioned");
            report.transitioned += 1;
        }
        self.tickets.save(&ticket).await?;
        Ok(())
    }

    /// Gather external facts, querying market data only when the ticket's
    /// rule actually needs them.
    async fn build_context(
        &self,
        ticket: &OrderTicket,
        now: Timestamp,
    ) -> anyhow::Result<CycleContext> {
        let needs_market = ticket.internal_state() == InternalState::Waiting
            && ticket.strategy() == Some(ExecutionStrategy::BestX);
        if !needs_market {
            return Ok(CycleContext {
                now,
                market_open: false,
                has_reference_data: false,
            });
        }

        let market_open = self
            .market_data
            .is_market_open(ticket.fx_pair(), now)
            .await?;
        let has_reference_data = self
            .market_data
            .reference_price(ticket.fx_pair(), now)
            .await?
            .is_some();
        Ok(CycleContext {
            now,
            market_open,
            has_reference_data,
        })
    }
}
