//! Ticket Repository Trait
//!
//! Defines the persistence abstraction for order tickets. Implemented by
//! adapters in the infrastructure layer.

use async_trait::async_trait;

use super::errors::TicketError;
use super::ticket::OrderTicket;
use crate::domain::shared::{CompanyId, TicketId};

/// Repository trait for order tickets.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Save a ticket (insert or update).
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn save(&self, ticket: &OrderTicket) -> Result<(), TicketError>;

    /// Find a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<OrderTicket>, TicketError>;

    /// All tickets not yet closed, across companies.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn find_open(&self) -> Result<Vec<OrderTicket>, TicketError>;

    /// All open tickets for one company.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    async fn find_open_for_company(
        &self,
        company: &CompanyId,
    ) -> Result<Vec<OrderTicket>, TicketError>;
}
