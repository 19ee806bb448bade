//! Simulated execution venue.
//!
//! Fills every submitted order in full at the configured reference price,
//! with no commission. Cancels are acknowledged immediately. Suitable for
//! paper runs and testing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::application::ports::{VenueError, VenuePort};
use crate::domain::reconciliation::FxFillSummary;
use crate::domain::shared::{FxPair, VenueOrderId};
use crate::domain::tickets::OrderTicket;

#[derive(Debug, Clone)]
struct WorkingOrder {
    pair: FxPair,
    amount: Decimal,
    cancelled: bool,
}

/// Simulated venue adapter.
#[derive(Debug, Default)]
pub struct SimulatedVenue {
    prices: RwLock<HashMap<FxPair, Decimal>>,
    orders: RwLock<HashMap<VenueOrderId, WorkingOrder>>,
}

impl SimulatedVenue {
    /// Create a new empty venue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill price for a pair. Orders in pairs with no price are
    /// rejected.
    pub fn set_price(&self, pair: FxPair, price: Decimal) {
        let mut prices = self.prices.write().unwrap_or_else(PoisonError::into_inner);
        prices.insert(pair, price);
    }

    /// Number of orders submitted so far.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a cancel was acknowledged for the order.
    #[must_use]
    pub fn is_cancelled(&self, order_id: &VenueOrderId) -> bool {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(order_id)
            .is_some_and(|o| o.cancelled)
    }
}

#[async_trait]
impl VenuePort for SimulatedVenue {
    async fn submit(&self, ticket: &OrderTicket) -> Result<VenueOrderId, VenueError> {
        let has_price = {
            let prices = self.prices.read().unwrap_or_else(PoisonError::into_inner);
            prices.contains_key(ticket.fx_pair())
        };
        if !has_price {
            return Err(VenueError::Rejected {
                reason: format!("no market in {}", ticket.fx_pair()),
            });
        }

        let order_id = VenueOrderId::generate();
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        orders.insert(
            order_id.clone(),
            WorkingOrder {
                pair: ticket.fx_pair().clone(),
                amount: ticket.amount(),
                cancelled: false,
            },
        );
        info!(ticket = %ticket.id(), order = %order_id, "order accepted");
        Ok(order_id)
    }

    async fn cancel(&self, order_id: &VenueOrderId) -> Result<(), VenueError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| VenueError::UnknownOrder {
                order_id: order_id.to_string(),
            })?;
        order.cancelled = true;
        Ok(())
    }

    async fn get_fills(
        &self,
        order_id: &VenueOrderId,
    ) -> Result<Option<FxFillSummary>, VenueError> {
        let order = {
            let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
            orders
                .get(order_id)
                .cloned()
                .ok_or_else(|| VenueError::UnknownOrder {
                    order_id: order_id.to_string(),
                })?
        };
        if order.cancelled {
            return Ok(None);
        }

        let prices = self.prices.read().unwrap_or_else(PoisonError::into_inner);
        Ok(prices.get(&order.pair).map(|price| {
            FxFillSummary::new(order.amount, Decimal::ZERO, Decimal::ZERO, *price)
        }))
    }
}
