//! Venue Port (Driven Port)
//!
//! Interface for submitting orders to and querying fills from an execution
//! venue.

use async_trait::async_trait;

use crate::domain::reconciliation::FxFillSummary;
use crate::domain::shared::VenueOrderId;
use crate::domain::tickets::OrderTicket;

/// Venue error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VenueError {
    /// Connection error.
    #[error("Venue connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// The venue rejected the order.
    #[error("Order rejected by venue: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// The venue does not recognize the order.
    #[error("Unknown venue order: {order_id}")]
    UnknownOrder {
        /// Venue order ID.
        order_id: String,
    },
}

/// Port for the execution venue.
#[async_trait]
pub trait VenuePort: Send + Sync {
    /// Submit a ticket's order to its destination venue.
    ///
    /// # Errors
    ///
    /// Returns error if the venue rejects the order or cannot be reached.
    async fn submit(&self, ticket: &OrderTicket) -> Result<VenueOrderId, VenueError>;

    /// Request cancellation of a working order. The cancel is asynchronous;
    /// the ack arrives out of band.
    ///
    /// # Errors
    ///
    /// Returns error if the venue cannot be reached.
    async fn cancel(&self, order_id: &VenueOrderId) -> Result<(), VenueError>;

    /// Fills for an order, `None` if nothing has traded yet.
    ///
    /// # Errors
    ///
    /// Returns error if the venue cannot be reached.
    async fn get_fills(&self, order_id: &VenueOrderId)
        -> Result<Option<FxFillSummary>, VenueError>;
}
