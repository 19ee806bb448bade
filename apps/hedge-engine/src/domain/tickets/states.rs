//! Ticket lifecycle states and related enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Internal lifecycle state of an order ticket.
///
/// The driver re-evaluates every ticket against its current state once per
/// sweep; states with no satisfied rule simply hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InternalState {
    /// Freshly created, not yet picked up by the driver.
    New,
    /// Awaiting authorization.
    PendAuth,
    /// Awaiting external funding confirmation.
    PendFunds,
    /// Authorized, waiting for its start time.
    Scheduled,
    /// A pause was requested and is being processed.
    PendPause,
    /// A resume was requested and is being processed.
    PendResume,
    /// Eligible to trade, waiting on its execution strategy.
    Waiting,
    /// Accepted for execution.
    Accepted,
    /// A cancel was sent to the destination; awaiting the ack.
    PendCancel,
    /// Terminal.
    Closed,
}

impl InternalState {
    /// Whether a cancel request can still take effect in this state.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        !matches!(self, Self::PendCancel | Self::Closed)
    }

    /// Whether the ticket can be paused from this state. Once the ticket is
    /// accepted or cancelling it is too late to pause.
    #[must_use]
    pub const fn is_pauseable(self) -> bool {
        matches!(
            self,
            Self::New | Self::PendAuth | Self::PendFunds | Self::Scheduled | Self::Waiting
        )
    }

    /// Whether this state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for InternalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "NEW",
            Self::PendAuth => "PENDAUTH",
            Self::PendFunds => "PENDFUNDS",
            Self::Scheduled => "SCHEDULED",
            Self::PendPause => "PENDPAUSE",
            Self::PendResume => "PENDRESUME",
            Self::Waiting => "WAITING",
            Self::Accepted => "ACCEPTED",
            Self::PendCancel => "PENDCANCEL",
            Self::Closed => "CLOSED",
        };
        write!(f, "{s}")
    }
}

/// Whether the ticket is live at its destination venue. Tracked separately
/// from [`InternalState`] so a ticket can be cancelled or paused without
/// losing track of what the venue believes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Not submitted to any venue.
    Idle,
    /// Live at the destination venue.
    Working,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Working => write!(f, "WORKING"),
        }
    }
}

/// How a ticket should be executed once eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Pre-negotiated request-for-quote; skips authorization.
    Rfq,
    /// Best-execution: waits for an open market with reference data.
    BestX,
    /// Execute at market immediately.
    Market,
    /// Delegated to an external asynchronous executor.
    StrategicExecution,
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rfq => "RFQ",
            Self::BestX => "BESTX",
            Self::Market => "MARKET",
            Self::StrategicExecution => "STRATEGIC_EXECUTION",
        };
        write!(f, "{s}")
    }
}

/// Status of a delegated execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Handed to the external executor, not yet started.
    Pending,
    /// The external executor is working the order.
    Working,
    /// The external executor finished.
    Done,
}

/// How a ticket's trade is funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingModel {
    /// Margin was posted up front; authorization alone releases the ticket.
    Premargined,
    /// Funds must be confirmed before release.
    Prefunded,
}
