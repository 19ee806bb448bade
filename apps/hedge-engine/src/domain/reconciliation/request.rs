//! Account hedge requests and results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{AccountId, FxPair, HedgeActionId};

/// One account's requested change in position for a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHedgeRequest {
    account: AccountId,
    fx_pair: FxPair,
    hedge_action: HedgeActionId,
    requested_amount: Decimal,
}

impl AccountHedgeRequest {
    /// Create a hedge request.
    #[must_use]
    pub const fn new(
        account: AccountId,
        fx_pair: FxPair,
        hedge_action: HedgeActionId,
        requested_amount: Decimal,
    ) -> Self {
        Self {
            account,
            fx_pair,
            hedge_action,
            requested_amount,
        }
    }

    /// Get the requesting account.
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

    /// Get the signed requested change.
    #[must_use]
    pub const fn requested_amount(&self) -> Decimal {
        self.requested_amount
    }
}

/// Terminal status of a hedge request after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HedgeResultStatus {
    /// The request traded and filled.
    Filled,
    /// The request was closed without trading.
    Closed,
}

/// The reconciled outcome of one account's hedge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHedgeResult {
    account: AccountId,
    fx_pair: FxPair,
    filled_amount: Decimal,
    realized_pnl_quote: Decimal,
    avg_price: Option<Decimal>,
    commission: Decimal,
    cntr_commission: Decimal,
}

impl AccountHedgeResult {
    /// Create a result for a request.
    #[must_use]
    pub const fn new(
        account: AccountId,
        fx_pair: FxPair,
        filled_amount: Decimal,
        realized_pnl_quote: Decimal,
        avg_price: Option<Decimal>,
        commission: Decimal,
        cntr_commission: Decimal,
    ) -> Self {
        Self {
            account,
            fx_pair,
            filled_amount,
            realized_pnl_quote,
            avg_price,
            commission,
            cntr_commission,
        }
    }

    /// Get the account.
    #[must_use]
    pub const fn account(&self) -> &AccountId {
        &self.account
    }

    /// Get the currency pair.
    #[must_use]
    pub const fn fx_pair(&self) -> &FxPair {
        &self.fx_pair
    }

    /// Get the amount attributed to this account.
    #[must_use]
    pub const fn filled_amount(&self) -> Decimal {
        self.filled_amount
    }

    /// Get the realized PnL in the quote currency.
    #[must_use]
    pub const fn realized_pnl_quote(&self) -> Decimal {
        self.realized_pnl_quote
    }

    /// Get the average price applied, if known.
    #[must_use]
    pub const fn avg_price(&self) -> Option<Decimal> {
        self.avg_price
    }

    /// Get this account's share of the commission.
    #[must_use]
    pub const fn commission(&self) -> Decimal {
        self.commission
    }

    /// Get this account's share of the counter-currency commission.
    #[must_use]
    pub const fn cntr_commission(&self) -> Decimal {
        self.cntr_commission
    }
}
