//! FX positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{AccountId, FxPair};

/// One account's holding in a currency pair with its cost basis.
///
/// Unrealized PnL is derived, never stored: `average_price` is
/// `total_price / amount` and is undefined when the position is flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxPosition {
    account: AccountId,
    fx_pair: FxPair,
    amount: Decimal,
    total_price: Decimal,
}

impl FxPosition {
    /// Create a position with a signed amount and cost basis.
    #[must_use]
    pub const fn new(
        account: AccountId,
        fx_pair: FxPair,
        amount: Decimal,
        total_price: Decimal,
    ) -> Self {
        Self {
            account,
            fx_pair,
            amount,
            total_price,
        }
    }

    /// Get the owning account.
    #[must_use]
    pub const fn account(&self) -> &AccountId {
        &self.account
    }

    /// Get the currency pair.
    #[must_use]
    pub const fn fx_pair(&self) -> &FxPair {
        &self.fx_pair
    }

    /// Get the signed position amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the signed cost basis.
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Average entry price, `None` for a flat position.
    #[must_use]
    pub fn average_price(&self) -> Option<Decimal> {
        if self.amount.is_zero() {
            None
        } else {
            Some(self.total_price / self.amount)
        }
    }

    /// Unrealized PnL at the given rate, `None` for a flat position.
    #[must_use]
    pub fn unrealized_pnl(&self, current_rate: Decimal) -> Option<Decimal> {
        self.average_price()
            .map(|avg| self.amount * (current_rate - avg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(amount: Decimal, total_price: Decimal) -> FxPosition {
        FxPosition::new(
            AccountId::new("acct-1"),
            FxPair::new("EUR", "USD"),
            amount,
            total_price,
        )
    }

    #[test]
    fn average_price_is_cost_over_amount() {
        let pos = position(dec!(100000), dec!(108000));
        assert_eq!(pos.average_price(), Some(dec!(1.08)));
    }

    #[test]
    fn flat_position_has_no_average_price() {
        let pos = position(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(pos.average_price(), None);
        assert_eq!(pos.unrealized_pnl(dec!(1.10)), None);
    }

    #[test]
    fn unrealized_pnl_for_long_position() {
        let pos = position(dec!(100000), dec!(108000));
        // 100_000 * (1.10 - 1.08)
        assert_eq!(pos.unrealized_pnl(dec!(1.10)), Some(dec!(2000.00)));
    }

    #[test]
    fn unrealized_pnl_for_short_position() {
        let pos = position(dec!(-100000), dec!(-108000));
        // -100_000 * (1.10 - 1.08)
        assert_eq!(pos.unrealized_pnl(dec!(1.10)), Some(dec!(-2000.00)));
    }
}
