//! Reconciliation working data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fill::FxFillSummary;
use crate::domain::shared::FxPair;

/// Statistics gathered while reconciling one pair.
///
/// Accumulated during the pass and persisted afterwards for audit; the
/// derived quantities let the validity of a reconciliation be re-checked
/// later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationData {
    /// The pair under reconciliation.
    pub fx_pair: FxPair,
    /// Total change all accounts together requested.
    pub total_account_requested_change: Decimal,
    /// Sum of absolute per-account requested changes.
    pub absolute_sum_of_account_requests: Decimal,
    /// Sum of absolute per-account desired final positions.
    pub absolute_sum_of_desired_account_positions: Decimal,
    /// Company position before the pass.
    pub initial_amount: Decimal,
    /// Company position after the pass.
    pub final_amount: Decimal,
    /// Total position all accounts want.
    pub desired_final_amount: Decimal,
    /// Amount filled through the pool, the market, or both.
    pub filled_amount: Decimal,
    /// The venue fill, if any order traded. Absence is a valid outcome.
    pub fill_summary: Option<FxFillSummary>,
}

impl ReconciliationData {
    /// Create empty data for one pair.
    #[must_use]
    pub const fn new(fx_pair: FxPair) -> Self {
        Self {
            fx_pair,
            total_account_requested_change: Decimal::ZERO,
            absolute_sum_of_account_requests: Decimal::ZERO,
            absolute_sum_of_desired_account_positions: Decimal::ZERO,
            initial_amount: Decimal::ZERO,
            final_amount: Decimal::ZERO,
            desired_final_amount: Decimal::ZERO,
            filled_amount: Decimal::ZERO,
            fill_summary: None,
        }
    }

    /// Whether any order traded for this pair during the period.
    #[must_use]
    pub const fn had_associated_order(&self) -> bool {
        self.fill_summary.is_some()
    }

    /// How much more of the pair the company holds than the accounts
    /// collectively desire. Positive means surplus.
    #[must_use]
    pub fn excess_amount(&self) -> Decimal {
        self.final_amount - self.desired_final_amount
    }

    /// Change between the initial and final company positions.
    #[must_use]
    pub fn change_in_position(&self) -> Decimal {
        self.final_amount - self.initial_amount
    }

    /// How much was filled by market orders.
    #[must_use]
    pub fn market_filled_amount(&self) -> Decimal {
        self.fill_summary.map_or(Decimal::ZERO, |f| f.amount_filled)
    }

    /// Commission charged for orders, zero if none traded.
    #[must_use]
    pub fn commission(&self) -> Decimal {
        self.fill_summary.map_or(Decimal::ZERO, |f| f.commission)
    }

    /// Counter-currency commission charged, zero if none traded.
    #[must_use]
    pub fn cntr_commission(&self) -> Decimal {
        self.fill_summary.map_or(Decimal::ZERO, |f| f.cntr_commission)
    }

    /// Average trade price, `None` when no trading occurred.
    #[must_use]
    pub fn average_price_from_trade(&self) -> Option<Decimal> {
        self.fill_summary.map(|f| f.average_price)
    }

    /// Position change that the filled orders cannot account for. Usually
    /// tiny; pairs are virtual holdings paired from currency balances, so
    /// roll costs and fees can move them without a trade.
    #[must_use]
    pub fn unexplained_change(&self) -> Decimal {
        self.change_in_position() - self.filled_amount
    }

    /// Actual change minus the total change the accounts requested.
    #[must_use]
    pub fn excess_change(&self) -> Decimal {
        self.change_in_position() - self.total_account_requested_change
    }
}
