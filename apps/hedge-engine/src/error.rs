//! Engine-wide error taxonomy.
//!
//! Every failure the engine surfaces is classified into one of six codes,
//! which decide how callers react:
//!
//! | Code | Reaction |
//! |------|----------|
//! | `NOT_FOUND` | Referenced entity does not exist |
//! | `PERMISSION_DENIED` | Command not permitted in the current state |
//! | `RESOURCE_EXHAUSTED` | A leased resource pool is empty; retry later |
//! | `TRANSIENT` | Skip the item, log, continue the sweep |
//! | `INVARIANT_VIOLATION` | Degraded input; compute with zeros, log |
//! | `TRANSACTION_FAILED` | Multi-write aborted; nothing was persisted |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::{
    CallbackError, EventPublishError, MarketDataError, VenueError,
};
use crate::domain::positions::PositionError;
use crate::domain::tickets::TicketError;
use crate::domain::timeline::TimelineError;
use crate::infrastructure::broker::ClientIdError;

/// Error codes for the hedge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity does not exist.
    NotFound,
    /// Command not permitted for the entity's current state.
    PermissionDenied,
    /// A bounded resource pool (client ids) is fully leased.
    ResourceExhausted,
    /// Recoverable failure of one item; the batch continues.
    Transient,
    /// Input violated an invariant and was degraded rather than fatal.
    InvariantViolation,
    /// A multi-step write was aborted with no partial effects.
    TransactionFailed,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::Transient => "TRANSIENT",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::TransactionFailed => "TRANSACTION_FAILED",
        }
    }

    /// Whether a caller should retry the same operation later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhausted | Self::Transient)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A classified error with context for the hedge engine.
#[derive(Debug, Error)]
pub struct EngineError {
    code: ErrorCode,
    message: String,
    context: Vec<(String, String)>,
}

impl EngineError {
    /// Create a new engine error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

impl From<TimelineError> for EngineError {
    fn from(err: TimelineError) -> Self {
        let code = match &err {
            TimelineError::EventNotFound { .. } | TimelineError::HedgeActionNotFound { .. } => {
                ErrorCode::NotFound
            }
            TimelineError::Storage { .. } => ErrorCode::Transient,
        };
        Self::new(code, err.to_string())
    }
}

impl From<TicketError> for EngineError {
    fn from(err: TicketError) -> Self {
        let code = match &err {
            TicketError::NotFound { .. } => ErrorCode::NotFound,
            TicketError::InvalidStateTransition { .. }
            | TicketError::CannotPause { .. }
            | TicketError::AlreadyPaused
            | TicketError::NotPaused
            | TicketError::CannotCancel { .. }
            | TicketError::NoDestination => ErrorCode::PermissionDenied,
            TicketError::Storage { .. } => ErrorCode::Transient,
        };
        Self::new(code, err.to_string())
    }
}

impl From<PositionError> for EngineError {
    fn from(err: PositionError) -> Self {
        let code = match &err {
            PositionError::SnapshotNotFound { .. } => ErrorCode::NotFound,
            PositionError::SelfLink { .. } | PositionError::DuplicateSnapshot { .. } => {
                ErrorCode::TransactionFailed
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<ClientIdError> for EngineError {
    fn from(err: ClientIdError) -> Self {
        Self::new(ErrorCode::ResourceExhausted, err.to_string())
    }
}

impl From<VenueError> for EngineError {
    fn from(err: VenueError) -> Self {
        let code = match &err {
            VenueError::UnknownOrder { .. } => ErrorCode::NotFound,
            VenueError::ConnectionError { .. } | VenueError::Rejected { .. } => {
                ErrorCode::Transient
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<MarketDataError> for EngineError {
    fn from(err: MarketDataError) -> Self {
        let code = match &err {
            MarketDataError::UnknownPair { .. } => ErrorCode::NotFound,
            MarketDataError::ConnectionError { .. } => ErrorCode::Transient,
        };
        Self::new(code, err.to_string())
    }
}

impl From<CallbackError> for EngineError {
    fn from(err: CallbackError) -> Self {
        let code = match &err {
            CallbackError::NotFound { .. } => ErrorCode::NotFound,
            CallbackError::Storage { .. } => ErrorCode::TransactionFailed,
        };
        Self::new(code, err.to_string())
    }
}

impl From<EventPublishError> for EngineError {
    fn from(err: EventPublishError) -> Self {
        Self::new(ErrorCode::Transient, err.to_string())
    }
}
