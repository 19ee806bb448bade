//! Ticket errors.

use std::fmt;

use super::states::InternalState;

/// Errors raised by ticket commands and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// Ticket not found.
    NotFound {
        /// Ticket ID.
        ticket_id: String,
    },

    /// The requested command is not valid in the ticket's current state.
    InvalidStateTransition {
        /// Current state.
        from: InternalState,
        /// Requested state.
        to: InternalState,
        /// Why the transition is rejected.
        reason: String,
    },

    /// Too late to pause the ticket.
    CannotPause {
        /// Current state.
        state: InternalState,
    },

    /// The ticket is already paused.
    AlreadyPaused,

    /// The ticket is not paused.
    NotPaused,

    /// Cancel requested in a state that cannot cancel.
    CannotCancel {
        /// Current state.
        state: InternalState,
    },

    /// The ticket has no destination to submit to.
    NoDestination,

    /// Underlying storage failed.
    Storage {
        /// Error details.
        message: String,
    },
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { ticket_id } => write!(f, "Ticket not found: {ticket_id}"),
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Invalid transition {from} -> {to}: {reason}")
            }
            Self::CannotPause { state } => write!(f, "Too late to pause ticket in {state}"),
            Self::AlreadyPaused => write!(f, "Ticket already paused"),
            Self::NotPaused => write!(f, "Ticket is not paused"),
            Self::CannotCancel { state } => write!(f, "Cannot cancel ticket in {state}"),
            Self::NoDestination => write!(f, "Ticket has no destination"),
            Self::Storage { message } => write!(f, "Ticket storage error: {message}"),
        }
    }
}

impl std::error::Error for TicketError {}
