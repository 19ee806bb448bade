//! Ticket cycle state machine.
//!
//! Pure, level-triggered evaluation of one ticket against the transition
//! table. The driver re-evaluates every open ticket each sweep regardless of
//! how it reached its current state, so the machine is self-healing against
//! missed events and safe to re-run after a crash. No rule firing is a valid
//! outcome: the ticket holds.

use super::states::{ExecutionStatus, ExecutionStrategy, FundingModel, InternalState, Phase};
use super::ticket::OrderTicket;
use crate::domain::shared::Timestamp;

/// External facts the machine needs beyond the ticket itself.
#[derive(Debug, Clone, Copy)]
pub struct CycleContext {
    /// Evaluation time.
    pub now: Timestamp,
    /// Whether the ticket's market is open for trading.
    pub market_open: bool,
    /// Whether an executable reference quote exists for the pair.
    pub has_reference_data: bool,
}

/// Side effect attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// No side effect.
    None,
    /// The ticket goes live at its destination venue.
    GoWorking,
    /// Hand the ticket to the external strategic executor.
    DelegateExecution,
}

/// One evaluated step of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State to move to (may equal the current state).
    pub next_state: InternalState,
    /// Side effect to apply with the move.
    pub effect: Effect,
}

impl Transition {
    const fn hold(state: InternalState) -> Self {
        Self {
            next_state: state,
            effect: Effect::None,
        }
    }
}

/// The ticket cycle driver's transition table.
pub struct TicketCycle;

impl TicketCycle {
    /// Evaluate one ticket against the table. Total: every (state, input)
    /// combination yields a defined transition, holding state when no rule
    /// fires. Paused tickets always hold.
    #[must_use]
    pub fn evaluate(ticket: &OrderTicket, ctx: &CycleContext) -> Transition {
        let state = ticket.internal_state();

        if ticket.is_paused() {
            return Transition::hold(state);
        }

        match state {
            InternalState::New => Transition {
                next_state: InternalState::PendAuth,
                effect: Effect::None,
            },

            InternalState::PendAuth => {
                let routed = ticket.destination().is_some();
                let rfq = ticket.strategy() == Some(ExecutionStrategy::Rfq);
                let premargined_and_authed = ticket.funding() == Some(FundingModel::Premargined)
                    && ticket.auth_user().is_some();
                if routed && (rfq || premargined_and_authed) {
                    Transition {
                        next_state: InternalState::Accepted,
                        effect: Effect::GoWorking,
                    }
                } else {
                    Transition::hold(state)
                }
            }

            InternalState::Scheduled => {
                let released = ticket.start_time().is_none_or(|start| ctx.now >= start);
                if released && ticket.destination().is_some() {
                    Transition {
                        next_state: InternalState::Accepted,
                        effect: Effect::None,
                    }
                } else {
                    Transition::hold(state)
                }
            }

            InternalState::Waiting => match ticket.strategy() {
                Some(ExecutionStrategy::BestX) => {
                    if ticket.has_trigger() && ctx.market_open && ctx.has_reference_data {
                        Transition {
                            next_state: InternalState::Accepted,
                            effect: Effect::GoWorking,
                        }
                    } else {
                        Transition::hold(state)
                    }
                }
                Some(ExecutionStrategy::StrategicExecution) => Transition {
                    next_state: InternalState::Waiting,
                    effect: Effect::DelegateExecution,
                },
                // MARKET and unset mean immediate execution. RFQ tickets
                // exit the machine at PENDAUTH and never reach WAITING; a
                // stray one executes as market rather than holding forever.
                Some(ExecutionStrategy::Market | ExecutionStrategy::Rfq) | None => Transition {
                    next_state: InternalState::Accepted,
                    effect: Effect::GoWorking,
                },
            },

            InternalState::Accepted => Transition {
                next_state: InternalState::Accepted,
                effect: Effect::GoWorking,
            },

            // Held states: these only leave via external signals.
            InternalState::PendFunds
            | InternalState::PendPause
            | InternalState::PendResume
            | InternalState::PendCancel
            | InternalState::Closed => Transition::hold(state),
        }
    }

    /// Apply an evaluated transition to the ticket.
    pub fn apply(ticket: &mut OrderTicket, transition: Transition) {
        ticket.set_internal_state(transition.next_state);
        match transition.effect {
            Effect::None => {}
            Effect::GoWorking => ticket.set_phase(Phase::Working),
            Effect::DelegateExecution => {
                // Only hand off once; re-evaluation must not re-enqueue.
                if ticket.execution_status().is_none() {
                    ticket.set_execution_status(ExecutionStatus::Pending);
                }
            }
        }
    }

    /// Evaluate and apply in one step, returning the transition taken.
    pub fn step(ticket: &mut OrderTicket, ctx: &CycleContext) -> Transition {
        let transition = Self::evaluate(ticket, ctx);
        Self::apply(ticket, transition);
        transition
    }
}
