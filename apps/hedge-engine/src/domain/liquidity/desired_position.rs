//! Per-account desired positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{AccountId, FxPair, HedgeActionId};

/// How much of a currency pair one account wants to hold after a hedging
/// cycle.
///
/// `amount` is the post-netting desire; `pre_liquidity_amount` is set if and
/// only if liquidity netting changed the raw request for this pair. Keeping
/// both lets downstream auditing recompute how much trading was saved by
/// netting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredPosition {
    account: AccountId,
    fx_pair: FxPair,
    hedge_action: HedgeActionId,
    amount: Decimal,
    pre_liquidity_amount: Option<Decimal>,
}

impl DesiredPosition {
    /// Create a raw (pre-netting) desired position.
    #[must_use]
    pub const fn new(
        account: AccountId,
        fx_pair: FxPair,
        hedge_action: HedgeActionId,
        amount: Decimal,
    ) -> Self {
        Self {
            account,
            fx_pair,
            hedge_action,
            amount,
            pre_liquidity_amount: None,
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

    /// Get the parent hedge action.
    #[must_use]
    pub const fn hedge_action(&self) -> &HedgeActionId {
        &self.hedge_action
    }

    /// Get the (post-netting) desired amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the pre-netting amount, if netting changed this position.
    #[must_use]
    pub const fn pre_liquidity_amount(&self) -> Option<Decimal> {
        self.pre_liquidity_amount
    }

    /// Apply a liquidity-netting adjustment.
    ///
    /// Records the original request in `pre_liquidity_amount` the first time
    /// the amount actually changes; a no-op adjustment leaves the position
    /// untouched, preserving the "set iff netting changed it" invariant.
    pub fn apply_netting(&mut self, new_amount: Decimal) {
        if new_amount == self.amount {
            return;
        }
        if self.pre_liquidity_amount.is_none() {
            self.pre_liquidity_amount = Some(self.amount);
        }
        self.amount = new_amount;
    }

    /// The signed per-account adjustment netting made (zero if untouched).
    #[must_use]
    pub fn liquidity_difference(&self) -> Decimal {
        self.pre_liquidity_amount
            .map_or(Decimal::ZERO, |pre| self.amount - pre)
    }
}
