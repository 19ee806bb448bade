//! Reconciliation records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::data::ReconciliationData;
use crate::domain::shared::{CompanyId, EventId, FxPair};

/// Persisted audit row for one (event, pair, company, live-flag)
/// reconciliation, unique on that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    event: EventId,
    company: CompanyId,
    fx_pair: FxPair,
    is_live: bool,
    initial_amount: Decimal,
    final_amount: Decimal,
    desired_final_amount: Decimal,
    filled_amount: Decimal,
    total_account_requested_change: Decimal,
    commission: Decimal,
    cntr_commission: Decimal,
}

impl ReconciliationRecord {
    /// Build a record from the working data of a finished pass.
    #[must_use]
    pub fn from_data(
        event: EventId,
        company: CompanyId,
        data: &ReconciliationData,
        is_live: bool,
    ) -> Self {
        Self {
            event,
            company,
            fx_pair: data.fx_pair.clone(),
            is_live,
            initial_amount: data.initial_amount,
            final_amount: data.final_amount,
            desired_final_amount: data.desired_final_amount,
            filled_amount: data.filled_amount,
            total_account_requested_change: data.total_account_requested_change,
            commission: data.commission(),
            cntr_commission: data.cntr_commission(),
        }
    }

    /// Get the anchoring event.
    #[must_use]
    pub const fn event(&self) -> &EventId {
        &self.event
    }

    /// Get the company.
    #[must_use]
    pub const fn company(&self) -> &CompanyId {
        &self.company
    }

    /// Get the currency pair.
    #[must_use]
    pub const fn fx_pair(&self) -> &FxPair {
        &self.fx_pair
    }

    /// Whether this was a live-account pass.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.is_live
    }

    /// Get the company position before the pass.
    #[must_use]
    pub const fn initial_amount(&self) -> Decimal {
        self.initial_amount
    }

    /// Get the company position after the pass.
    #[must_use]
    pub const fn final_amount(&self) -> Decimal {
        self.final_amount
    }

    /// Get the position all accounts wanted.
    #[must_use]
    pub const fn desired_final_amount(&self) -> Decimal {
        self.desired_final_amount
    }

    /// Get the amount filled during the pass.
    #[must_use]
    pub const fn filled_amount(&self) -> Decimal {
        self.filled_amount
    }

    /// Get the total requested change.
    #[must_use]
    pub const fn total_account_requested_change(&self) -> Decimal {
        self.total_account_requested_change
    }

    /// Get the commission charged.
    #[must_use]
    pub const fn commission(&self) -> Decimal {
        self.commission
    }

    /// Get the counter-currency commission charged.
    #[must_use]
    pub const fn cntr_commission(&self) -> Decimal {
        self.cntr_commission
    }
}
