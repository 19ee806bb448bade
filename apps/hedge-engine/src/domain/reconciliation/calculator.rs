//! Reconciliation calculator.
//!
//! Pure per-pair reconciliation of venue-reported truth against internally
//! recorded positions. Persistence is the caller's concern; this module
//! only computes final positions, audit data and per-request results.

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use super::data::ReconciliationData;
use super::fill::FxFillSummary;
use super::request::{AccountHedgeRequest, AccountHedgeResult};
use crate::domain::positions::FxPosition;
use crate::domain::shared::{AccountId, FxPair};

/// Fills smaller than this are attributed to rounding, not trading.
const FILL_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Everything a reconciliation pass needs, gathered up front so the
/// algorithm itself makes no external calls.
#[derive(Debug, Default)]
pub struct ReconciliationInputs {
    /// Company positions before the pass, per pair.
    pub company_positions_before: HashMap<FxPair, Decimal>,
    /// Company positions after the pass, per pair.
    pub company_positions_after: HashMap<FxPair, Decimal>,
    /// Desired final positions per pair per account.
    pub account_desired_positions: HashMap<FxPair, HashMap<AccountId, Decimal>>,
    /// Account positions going into the pass.
    pub initial_account_positions: HashMap<FxPair, HashMap<AccountId, FxPosition>>,
    /// The hedge requests that drove this cycle's trading.
    pub account_hedge_requests: HashMap<FxPair, Vec<AccountHedgeRequest>>,
    /// Venue fills, keyed by pair. A missing pair simply did not trade.
    pub filled_amounts: HashMap<FxPair, FxFillSummary>,
    /// Reference prices for pairs that moved without trading.
    pub reference_prices: HashMap<FxPair, Decimal>,
}

/// Output of one reconciliation pass.
#[derive(Debug)]
pub struct ReconciliationOutcome {
    /// Final per-account positions, per pair.
    pub final_positions: HashMap<FxPair, HashMap<AccountId, FxPosition>>,
    /// Per-pair audit data.
    pub data: Vec<ReconciliationData>,
    /// Results for the hedge requests that were reconciled.
    pub results: Vec<AccountHedgeResult>,
}

/// Stateless per-company reconciliation.
pub struct ReconciliationCalculator;

impl ReconciliationCalculator {
    /// Reconcile every pair with activity for one company.
    ///
    /// Excess position is distributed by absolute desired-position weight: a
    /// larger position, in either direction, is affected less by a given
    /// surplus or shortfall. Trading costs are distributed by absolute
    /// request size instead, so an account that requested no trading incurs
    /// no costs.
    ///
    /// A pair with no requests and no fill degrades to "no fill, unchanged
    /// position" rather than failing the batch.
    #[must_use]
    pub fn reconcile_company(inputs: &ReconciliationInputs) -> ReconciliationOutcome {
        let mut fx_pairs: HashSet<FxPair> = HashSet::new();
        fx_pairs.extend(inputs.company_positions_before.keys().cloned());
        fx_pairs.extend(inputs.company_positions_after.keys().cloned());
        fx_pairs.extend(inputs.initial_account_positions.keys().cloned());
        fx_pairs.extend(inputs.account_hedge_requests.keys().cloned());
        fx_pairs.extend(inputs.account_desired_positions.keys().cloned());

        let mut outcome = ReconciliationOutcome {
            final_positions: HashMap::new(),
            data: Vec::new(),
            results: Vec::new(),
        };

        debug!(pairs = fx_pairs.len(), "beginning per-pair reconciliation");
        for fx_pair in fx_pairs {
            let (final_account_positions, data) = Self::reconcile_pair(
                &fx_pair,
                inputs,
                &mut outcome.results,
            );
            if !data.unexplained_change().is_zero() {
                warn!(
                    pair = %data.fx_pair,
                    unexplained = %data.unexplained_change(),
                    "unexplained change in position"
                );
            }
            outcome.final_positions.insert(fx_pair, final_account_positions);
            outcome.data.push(data);
        }

        outcome
    }

    fn reconcile_pair(
        fx_pair: &FxPair,
        inputs: &ReconciliationInputs,
        results: &mut Vec<AccountHedgeResult>,
    ) -> (HashMap<AccountId, FxPosition>, ReconciliationData) {
        let mut data = ReconciliationData::new(fx_pair.clone());
        data.initial_amount = inputs
            .company_positions_before
            .get(fx_pair)
            .copied()
            .unwrap_or(Decimal::ZERO);
        data.final_amount = inputs
            .company_positions_after
            .get(fx_pair)
            .copied()
            .unwrap_or(Decimal::ZERO);
        data.fill_summary = inputs.filled_amounts.get(fx_pair).copied();

        let empty_desired = HashMap::new();
        let desired_positions = inputs
            .account_desired_positions
            .get(fx_pair)
            .unwrap_or(&empty_desired);
        for desired in desired_positions.values() {
            data.desired_final_amount += desired;
            data.absolute_sum_of_desired_account_positions += desired.abs();
        }

        let empty_positions = HashMap::new();
        let account_positions = inputs
            .initial_account_positions
            .get(fx_pair)
            .unwrap_or(&empty_positions);

        let empty_requests = Vec::new();
        let requests = inputs
            .account_hedge_requests
            .get(fx_pair)
            .unwrap_or(&empty_requests);
        if requests.is_empty() && !data.market_filled_amount().is_zero() {
            // Trading without any request to cause it points at a bug
            // upstream; record it and carry on.
            error!(pair = %fx_pair, filled = %data.market_filled_amount(),
                "fills reported for a pair no account requested");
        }

        let mut requests_by_account: HashMap<AccountId, &AccountHedgeRequest> = HashMap::new();
        for request in requests {
            data.total_account_requested_change += request.requested_amount();
            data.absolute_sum_of_account_requests += request.requested_amount().abs();
            requests_by_account.insert(request.account().clone(), request);
        }

        // Edge case: nobody wants the pair, but the company still holds it.
        // Happens when e.g. a cashflow is deleted on a non-trading day.
        if data.absolute_sum_of_desired_account_positions.is_zero()
            && !data.final_amount.is_zero()
        {
            error!(pair = %fx_pair, balance = %data.final_amount,
                "all accounts want zero but the company holds a balance");
            let finals = Self::distribute_unwanted_balance(fx_pair, inputs, &data);
            return (finals, data);
        }

        let mut final_account_positions = HashMap::new();
        let excess = data.excess_amount();
        for (account, amount) in desired_positions {
            let w_pos = if data.absolute_sum_of_desired_account_positions > Decimal::ZERO {
                amount.abs() / data.absolute_sum_of_desired_account_positions
            } else {
                Decimal::ONE / Decimal::from(desired_positions.len())
            };
            let final_amount = amount + excess * w_pos;

            let initial_position = account_positions.get(account);
            let initial_amount =
                initial_position.map_or(Decimal::ZERO, FxPosition::amount);
            let mut filled_amount = final_amount - initial_amount;
            if filled_amount.abs() < FILL_EPSILON {
                filled_amount = Decimal::ZERO;
            }
            data.filled_amount += filled_amount;

            // The trade price if one occurred, a reference price otherwise.
            let avg_price = Self::average_price(fx_pair, &data, inputs);
            if avg_price.is_none() && !filled_amount.is_zero() {
                error!(pair = %fx_pair, filled = %filled_amount,
                    "position changed but no average price is available");
            }

            let initial_total_price =
                initial_position.map_or(Decimal::ZERO, FxPosition::total_price);
            let pnl_quote = if filled_amount.is_zero() {
                Decimal::ZERO
            } else {
                Self::realized_pnl(initial_position, avg_price, final_amount)
            };

            let new_total_price = Self::calculate_total_price(
                initial_total_price,
                initial_amount,
                avg_price,
                filled_amount,
            );

            if let Some(request) = requests_by_account.get(account) {
                let w_com = if data.absolute_sum_of_account_requests > Decimal::ZERO {
                    request.requested_amount().abs() / data.absolute_sum_of_account_requests
                } else {
                    Decimal::ZERO
                };
                results.push(AccountHedgeResult::new(
                    account.clone(),
                    fx_pair.clone(),
                    filled_amount,
                    pnl_quote,
                    avg_price,
                    w_com * data.commission(),
                    w_com * data.cntr_commission(),
                ));
            }

            final_account_positions.insert(
                account.clone(),
                FxPosition::new(account.clone(), fx_pair.clone(), final_amount, new_total_price),
            );
        }

        (final_account_positions, data)
    }

    /// Assign a balance nobody wants back across the accounts that last
    /// held it (or, failing that, across every known account).
    fn distribute_unwanted_balance(
        fx_pair: &FxPair,
        inputs: &ReconciliationInputs,
        data: &ReconciliationData,
    ) -> HashMap<AccountId, FxPosition> {
        let mut finals = HashMap::new();

        if let Some(last_positions) = inputs
            .initial_account_positions
            .get(fx_pair)
            .filter(|m| !m.is_empty())
        {
            let mut total_last = Decimal::ZERO;
            let mut abs_sum = Decimal::ZERO;
            for position in last_positions.values() {
                total_last += position.amount();
                abs_sum += position.amount().abs();
            }

            // Entirely flat prior holdings give no weights to distribute
            // by; fall through to the even split below.
            if !abs_sum.is_zero() {
                for (account, position) in last_positions {
                    // When the net holding was (near) zero we cannot
                    // normalize by it, so each account takes a share
                    // proportional to the absolute size of what it last
                    // held. Otherwise every account closes the same
                    // fraction of its holding so the collective matches
                    // today's balance.
                    let amount = if total_last.abs() < Decimal::ONE {
                        data.final_amount * (position.amount().abs() / abs_sum)
                    } else {
                        position.amount() * (data.final_amount / total_last)
                    };
                    finals.insert(
                        account.clone(),
                        FxPosition::new(account.clone(), fx_pair.clone(), amount, Decimal::ZERO),
                    );
                }
                return finals;
            }
        }

        // No account ever held the pair. Split evenly across every account
        // we know about; there is nothing better to normalize by.
        let mut all_accounts: HashSet<AccountId> = HashSet::new();
        for accounts in inputs.account_desired_positions.values() {
            all_accounts.extend(accounts.keys().cloned());
        }
        for accounts in inputs.initial_account_positions.values() {
            all_accounts.extend(accounts.keys().cloned());
        }
        if all_accounts.is_empty() {
            warn!(pair = %fx_pair, "company holds a balance but no accounts are known");
            return finals;
        }
        let share = data.final_amount / Decimal::from(all_accounts.len());
        for account in all_accounts {
            finals.insert(
                account.clone(),
                FxPosition::new(account, fx_pair.clone(), share, Decimal::ZERO),
            );
        }
        finals
    }

    /// The average price comes from trade tickets. When the position moved
    /// without trading (liquidity pool crossing), fall back to a reference
    /// price for bookkeeping.
    fn average_price(
        fx_pair: &FxPair,
        data: &ReconciliationData,
        inputs: &ReconciliationInputs,
    ) -> Option<Decimal> {
        data.average_price_from_trade().or_else(|| {
            let reference = inputs.reference_prices.get(fx_pair).copied();
            if reference.is_none() {
                warn!(pair = %fx_pair, "no trade price and no reference price available");
            }
            reference
        })
    }

    /// Realized PnL in the quote currency for the closed portion of the
    /// position, zero when the position only grew.
    fn realized_pnl(
        initial_position: Option<&FxPosition>,
        avg_price: Option<Decimal>,
        final_amount: Decimal,
    ) -> Decimal {
        let Some(position) = initial_position else {
            return Decimal::ZERO;
        };
        let Some(trade_price) = avg_price else {
            return Decimal::ZERO;
        };
        let Some(old_avg) = position.average_price() else {
            return Decimal::ZERO;
        };

        let old_amount = position.amount();
        let same_sign = old_amount.signum() == final_amount.signum();
        let closed_amount = if same_sign && final_amount.abs() >= old_amount.abs() {
            Decimal::ZERO
        } else if same_sign {
            old_amount - final_amount
        } else {
            old_amount
        };
        closed_amount * (trade_price - old_avg)
    }

    /// New cost basis after a fill. Total price is stored in absolute value
    /// terms; the sign of the old amount recovers its true sign before the
    /// fill is folded in.
    #[must_use]
    pub fn calculate_total_price(
        old_total_price: Decimal,
        old_amount: Decimal,
        latest_avg_price: Option<Decimal>,
        filled_amount: Decimal,
    ) -> Decimal {
        let avg_price = latest_avg_price.unwrap_or_else(|| {
            error!("average price missing while updating total price, using zero");
            Decimal::ZERO
        });
        (old_amount.signum() * old_total_price + avg_price * filled_amount).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> FxPair {
        FxPair::new("EUR", "USD")
    }

    fn account(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn request(name: &str, amount: Decimal) -> AccountHedgeRequest {
        AccountHedgeRequest::new(
            account(name),
            pair(),
            crate::domain::shared::HedgeActionId::new("ha-1"),
            amount,
        )
    }

    #[test]
    fn no_activity_degrades_to_no_fill() {
        let mut inputs = ReconciliationInputs::default();
        inputs
            .company_positions_before
            .insert(pair(), dec!(1000));
        inputs.company_positions_after.insert(pair(), dec!(1000));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        assert_eq!(outcome.data.len(), 1);
        let data = &outcome.data[0];
        assert!(!data.had_associated_order());
        assert_eq!(data.filled_amount, Decimal::ZERO);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn excess_is_distributed_by_desired_weight() {
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(1100));
        inputs.account_desired_positions.insert(
            pair(),
            HashMap::from([(account("a"), dec!(750)), (account("b"), dec!(250))]),
        );
        inputs.reference_prices.insert(pair(), dec!(1.08));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        // Excess of 100 splits 75/25 by |desired| weight.
        let finals = &outcome.final_positions[&pair()];
        assert_eq!(finals[&account("a")].amount(), dec!(825));
        assert_eq!(finals[&account("b")].amount(), dec!(275));
    }

    #[test]
    fn commission_is_distributed_by_request_weight() {
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(1000));
        inputs.account_desired_positions.insert(
            pair(),
            HashMap::from([(account("a"), dec!(600)), (account("b"), dec!(400))]),
        );
        inputs.account_hedge_requests.insert(
            pair(),
            vec![request("a", dec!(900)), request("b", dec!(100))],
        );
        inputs
            .filled_amounts
            .insert(pair(), FxFillSummary::new(dec!(1000), dec!(10), dec!(12), dec!(1.08)));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        assert_eq!(outcome.results.len(), 2);
        let a = outcome
            .results
            .iter()
            .find(|r| r.account() == &account("a"))
            .unwrap();
        let b = outcome
            .results
            .iter()
            .find(|r| r.account() == &account("b"))
            .unwrap();
        assert_eq!(a.commission(), dec!(9.0));
        assert_eq!(b.commission(), dec!(1.0));
        assert_eq!(a.cntr_commission(), dec!(10.8));
        assert_eq!(b.cntr_commission(), dec!(1.2));
    }

    #[test]
    fn filled_amounts_sum_to_company_change() {
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_before.insert(pair(), dec!(0));
        inputs.company_positions_after.insert(pair(), dec!(1000));
        inputs.account_desired_positions.insert(
            pair(),
            HashMap::from([(account("a"), dec!(700)), (account("b"), dec!(300))]),
        );
        inputs
            .filled_amounts
            .insert(pair(), FxFillSummary::new(dec!(1000), dec!(5), dec!(5), dec!(1.08)));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let data = &outcome.data[0];
        assert_eq!(data.filled_amount, dec!(1000));
        assert_eq!(data.unexplained_change(), Decimal::ZERO);
    }

    #[test]
    fn tiny_fills_are_zeroed() {
        let mut inputs = ReconciliationInputs::default();
        inputs
            .company_positions_before
            .insert(pair(), dec!(1000));
        inputs
            .company_positions_after
            .insert(pair(), dec!(1000.0000001));
        inputs
            .account_desired_positions
            .insert(pair(), HashMap::from([(account("a"), dec!(1000.0000001))]));
        inputs.initial_account_positions.insert(
            pair(),
            HashMap::from([(
                account("a"),
                FxPosition::new(account("a"), pair(), dec!(1000), dec!(1080)),
            )]),
        );
        inputs.reference_prices.insert(pair(), dec!(1.08));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);
        assert_eq!(outcome.data[0].filled_amount, Decimal::ZERO);
    }

    #[test]
    fn total_price_folds_fill_into_cost_basis() {
        // Long 1000 at cost 1080, buys 500 more at 1.10.
        let price = ReconciliationCalculator::calculate_total_price(
            dec!(1080),
            dec!(1000),
            Some(dec!(1.10)),
            dec!(500),
        );
        assert_eq!(price, dec!(1630.00));

        // Short position: sign recovered from the old amount.
        let price = ReconciliationCalculator::calculate_total_price(
            dec!(1080),
            dec!(-1000),
            Some(dec!(1.10)),
            dec!(-500),
        );
        assert_eq!(price, dec!(1630.00));
    }

    #[test]
    fn unwanted_balance_goes_to_previous_holders_pro_rata() {
        // Nobody wants the pair anymore but the company still holds 500.
        // Net last position was ~0, so holders split by absolute size.
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(500));
        inputs
            .account_desired_positions
            .insert(pair(), HashMap::from([(account("a"), dec!(0)), (account("b"), dec!(0))]));
        inputs.initial_account_positions.insert(
            pair(),
            HashMap::from([
                (
                    account("a"),
                    FxPosition::new(account("a"), pair(), dec!(300), dec!(324)),
                ),
                (
                    account("b"),
                    FxPosition::new(account("b"), pair(), dec!(-300), dec!(324)),
                ),
            ]),
        );

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let finals = &outcome.final_positions[&pair()];
        assert_eq!(finals[&account("a")].amount(), dec!(250));
        assert_eq!(finals[&account("b")].amount(), dec!(250));
    }

    #[test]
    fn unwanted_balance_scales_previous_holdings() {
        // Net last position non-zero: each holder keeps the same fraction.
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(500));
        inputs
            .account_desired_positions
            .insert(pair(), HashMap::from([(account("a"), dec!(0))]));
        inputs.initial_account_positions.insert(
            pair(),
            HashMap::from([
                (
                    account("a"),
                    FxPosition::new(account("a"), pair(), dec!(800), dec!(864)),
                ),
                (
                    account("b"),
                    FxPosition::new(account("b"), pair(), dec!(200), dec!(216)),
                ),
            ]),
        );

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let finals = &outcome.final_positions[&pair()];
        assert_eq!(finals[&account("a")].amount(), dec!(400));
        assert_eq!(finals[&account("b")].amount(), dec!(100));
    }

    #[test]
    fn unwanted_balance_with_flat_prior_holdings_splits_evenly() {
        // The prior holders are all flat (a fully crossed cycle leaves
        // zero-amount positions), so there is no holding to weight by and
        // the balance splits evenly across the known accounts.
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(500));
        inputs
            .account_desired_positions
            .insert(pair(), HashMap::from([(account("a"), dec!(0)), (account("b"), dec!(0))]));
        inputs.initial_account_positions.insert(
            pair(),
            HashMap::from([
                (
                    account("a"),
                    FxPosition::new(account("a"), pair(), dec!(0), dec!(0)),
                ),
                (
                    account("b"),
                    FxPosition::new(account("b"), pair(), dec!(0), dec!(0)),
                ),
            ]),
        );

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let finals = &outcome.final_positions[&pair()];
        assert_eq!(finals[&account("a")].amount(), dec!(250));
        assert_eq!(finals[&account("b")].amount(), dec!(250));
    }

    #[test]
    fn orphan_balance_splits_evenly_across_known_accounts() {
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_after.insert(pair(), dec!(600));
        inputs
            .account_desired_positions
            .insert(pair(), HashMap::new());
        // Accounts known only from another pair.
        inputs.account_desired_positions.insert(
            FxPair::new("GBP", "USD"),
            HashMap::from([(account("a"), dec!(100)), (account("b"), dec!(100))]),
        );
        inputs.reference_prices.insert(FxPair::new("GBP", "USD"), dec!(1.27));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let finals = &outcome.final_positions[&pair()];
        assert_eq!(finals[&account("a")].amount(), dec!(300));
        assert_eq!(finals[&account("b")].amount(), dec!(300));
    }

    #[test]
    fn realized_pnl_on_partial_close() {
        let mut inputs = ReconciliationInputs::default();
        inputs.company_positions_before.insert(pair(), dec!(1000));
        inputs.company_positions_after.insert(pair(), dec!(400));
        inputs
            .account_desired_positions
            .insert(pair(), HashMap::from([(account("a"), dec!(400))]));
        inputs.account_hedge_requests.insert(
            pair(),
            vec![request("a", dec!(-600))],
        );
        inputs.initial_account_positions.insert(
            pair(),
            HashMap::from([(
                account("a"),
                FxPosition::new(account("a"), pair(), dec!(1000), dec!(1080)),
            )]),
        );
        inputs
            .filled_amounts
            .insert(pair(), FxFillSummary::new(dec!(-600), dec!(3), dec!(3), dec!(1.10)));

        let outcome = ReconciliationCalculator::reconcile_company(&inputs);

        let result = &outcome.results[0];
        assert_eq!(result.filled_amount(), dec!(-600));
        // Sold 600 bought at 1.08, at 1.10.
        assert_eq!(result.realized_pnl_quote(), dec!(12.00));
    }
}
