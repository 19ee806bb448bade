//! Timeline errors.

use std::fmt;

/// Errors that can occur in the event timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Event not found.
    EventNotFound {
        /// Event ID.
        event_id: String,
    },

    /// Hedge action not found.
    HedgeActionNotFound {
        /// Hedge action ID.
        hedge_action_id: String,
    },

    /// Underlying storage failed.
    Storage {
        /// Error details.
        message: String,
    },
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventNotFound { event_id } => write!(f, "Event not found: {event_id}"),
            Self::HedgeActionNotFound { hedge_action_id } => {
                write!(f, "Hedge action not found: {hedge_action_id}")
            }
            Self::Storage { message } => write!(f, "Timeline storage error: {message}"),
        }
    }
}

impl std::error::Error for TimelineError {}
