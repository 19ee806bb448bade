//! Liquidity netting statistics.
//!
//! `LiquidityData` folds one pair's desired positions and pool exposure into
//! the derived figures the rest of the engine consumes: net demand, traded
//! volume avoided by netting, residual pool size, and pool utilization.

use rust_decimal::Decimal;

use super::desired_position::DesiredPosition;
use super::pool::LiquidityPoolRecord;
use crate::domain::shared::FxPair;

/// Derived liquidity figures for one currency pair in one hedging cycle.
#[derive(Debug, Clone)]
pub struct LiquidityData {
    fx_pair: FxPair,
    net_exposure: Decimal,
    positions: Vec<DesiredPosition>,
}

impl LiquidityData {
    /// Build liquidity data from a pool record (if any) and the pair's
    /// desired positions.
    ///
    /// A missing pool record degrades to zero exposure rather than failing:
    /// a company with no recorded pool simply has nothing to net against.
    #[must_use]
    pub fn new(
        fx_pair: FxPair,
        pool: Option<&LiquidityPoolRecord>,
        positions: Vec<DesiredPosition>,
    ) -> Self {
        let net_exposure = pool.map_or(Decimal::ZERO, LiquidityPoolRecord::total_exposure);
        Self {
            fx_pair,
            net_exposure,
            positions,
        }
    }

    /// Get the currency pair.
    #[must_use]
    pub const fn fx_pair(&self) -> &FxPair {
        &self.fx_pair
    }

    /// Signed aggregate exposure from the pool record (zero if absent).
    #[must_use]
    pub const fn net_exposure(&self) -> Decimal {
        self.net_exposure
    }

    /// The desired positions feeding this pair.
    #[must_use]
    pub fn positions(&self) -> &[DesiredPosition] {
        &self.positions
    }

    /// Sum of post-netting desired amounts across accounts.
    #[must_use]
    pub fn net_desired_position(&self) -> Decimal {
        self.positions.iter().map(DesiredPosition::amount).sum()
    }

    /// Trading volume avoided by netting: half the sum of absolute
    /// per-account adjustments, since each internally-crossed unit saves one
    /// buy and one sell.
    #[must_use]
    pub fn liquidity_change(&self) -> Decimal {
        let adjustments: Decimal = self
            .positions
            .iter()
            .map(|p| p.liquidity_difference().abs())
            .sum();
        adjustments / Decimal::TWO
    }

    /// Residual demand the broker must absorb after netting.
    #[must_use]
    pub fn pool_size(&self) -> Decimal {
        self.net_exposure - self.net_desired_position()
    }

    /// Fraction of the pool consumed by internal netting,
    /// `|liquidity_change / pool_size|`.
    ///
    /// Undefined (and `None`) when the pool size is zero; callers must not
    /// substitute a sentinel value.
    #[must_use]
    pub fn fractional_utilization(&self) -> Option<Decimal> {
        let pool_size = self.pool_size();
        if pool_size.is_zero() {
            None
        } else {
            Some((self.liquidity_change() / pool_size).abs())
        }
    }
}
