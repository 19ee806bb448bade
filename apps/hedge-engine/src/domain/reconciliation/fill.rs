//! Venue fill summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary of how a venue filled one pair's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxFillSummary {
    /// Signed amount filled.
    pub amount_filled: Decimal,
    /// Commission charged, in the base currency.
    pub commission: Decimal,
    /// Commission charged, in the counter currency.
    pub cntr_commission: Decimal,
    /// Volume-weighted average fill price.
    pub average_price: Decimal,
}

impl FxFillSummary {
    /// Create a fill summary.
    #[must_use]
    pub const fn new(
        amount_filled: Decimal,
        commission: Decimal,
        cntr_commission: Decimal,
        average_price: Decimal,
    ) -> Self {
        Self {
            amount_filled,
            commission,
            cntr_commission,
            average_price,
        }
    }
}
