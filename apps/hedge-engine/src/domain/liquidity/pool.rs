//! Liquidity pool records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{FxPair, HedgeActionId};

/// Aggregate company exposure to one currency pair, recorded per hedging
/// cycle.
///
/// A missing record for a pair means the company has no exposure to it; the
/// calculator treats that as zero rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPoolRecord {
    fx_pair: FxPair,
    hedge_action: HedgeActionId,
    total_exposure: Decimal,
}

impl LiquidityPoolRecord {
    /// Create a pool record for a pair within a hedging cycle.
    #[must_use]
    pub const fn new(fx_pair: FxPair, hedge_action: HedgeActionId, total_exposure: Decimal) -> Self {
        Self {
            fx_pair,
            hedge_action,
            total_exposure,
        }
    }

    /// Get the currency pair.
    #[must_use]
    pub const fn fx_pair(&self) -> &FxPair {
        &self.fx_pair
    }

    /// Get the parent hedge action.
    #[must_use]
    pub const fn hedge_action(&self) -> &HedgeActionId {
        &self.hedge_action
    }

    /// Get the signed aggregate exposure across all accounts.
    #[must_use]
    pub const fn total_exposure(&self) -> Decimal {
        self.total_exposure
    }
}
