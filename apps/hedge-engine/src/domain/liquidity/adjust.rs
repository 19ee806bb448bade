//! Liquidity absorption.
//!
//! When one account's demand can be offset internally by other accounts with
//! opposite-direction exposures, the engine lets those accounts take on
//! larger (more fully hedged) positions instead of submitting both sides to
//! the venue. This module redistributes a pair's absorbed liquidity across
//! the accounts that can carry it, weighted by remaining exposure.

use std::collections::HashMap;

use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;

use crate::domain::shared::AccountId;

/// Redistribute a liquidity absorption across accounts for one pair.
///
/// `account_exposures` maps each account to its signed cash exposure;
/// `desired_positions` maps each account to its requested position;
/// `change` is the signed liquidity the pool absorbed for the pair.
///
/// Each account's remaining exposure is `exposure + position` (the two carry
/// opposite signs when hedged). Only accounts whose remaining exposure has
/// the same sign as `change` participate; each participant's position moves
/// by `-(change / total_remaining) * remaining`, so larger unhedged
/// exposures absorb proportionally more. When no account's remaining
/// exposure matches the sign of the change, positions are returned
/// unmodified.
///
/// Example: account A has +130k exposure against a -100k position, B has
/// -50k against +10k, C has -70k against +20k. A -60k absorption is shared
/// between B (-40k remaining) and C (-50k remaining) at 2/3 each, yielding
/// final positions -100k, +36,666.67 and +53,333.33.
#[must_use]
pub fn liquidity_adjusted_positions(
    account_exposures: &HashMap<AccountId, Decimal>,
    desired_positions: &HashMap<AccountId, Decimal>,
    change: Decimal,
) -> HashMap<AccountId, Decimal> {
    let mut adjusted: HashMap<AccountId, Decimal> = desired_positions.clone();

    let mut remaining_exposures: HashMap<AccountId, Decimal> = HashMap::new();
    let mut total_remaining = Decimal::ZERO;
    for (account, amount) in desired_positions {
        let exposure = account_exposures
            .get(account)
            .copied()
            .unwrap_or(Decimal::ZERO);
        // Position and exposure cancel since they have opposite sign.
        let remaining = exposure + amount;
        if !remaining.is_zero() && remaining.signum() == change.signum() {
            remaining_exposures.insert(account.clone(), remaining);
            total_remaining += remaining;
        }
    }

    if total_remaining.is_zero() {
        return adjusted;
    }

    let fraction = change / total_remaining;
    for (account, remaining) in remaining_exposures {
        if let Some(amount) = adjusted.get_mut(&account) {
            // Position moves opposite to exposure.
            *amount -= fraction * remaining;
        }
    }

    adjusted
}

/// Cross opposing desired positions against each other for one pair.
///
/// The company-level net is preserved; the smaller side is absorbed to zero
/// and the larger side shrinks pro rata until it carries exactly the net.
/// Offsetting buy and sell demand cancels internally instead of both sides
/// being traded at the venue.
#[must_use]
pub fn cross_desired_positions(
    desired_positions: &HashMap<AccountId, Decimal>,
) -> HashMap<AccountId, Decimal> {
    let net: Decimal = desired_positions.values().sum();
    let positive: Decimal = desired_positions
        .values()
        .filter(|a| a.is_sign_positive())
        .sum();
    let negative: Decimal = desired_positions
        .values()
        .filter(|a| a.is_sign_negative())
        .sum();

    desired_positions
        .iter()
        .map(|(account, amount)| {
            let crossed = if amount.is_zero() {
                Decimal::ZERO
            } else if net.is_zero() {
                // Fully offset: everyone's demand is absorbed internally.
                Decimal::ZERO
            } else if net.is_sign_positive() {
                if amount.is_sign_positive() {
                    amount * (net / positive)
                } else {
                    Decimal::ZERO
                }
            } else if amount.is_sign_negative() {
                amount * (net / negative)
            } else {
                Decimal::ZERO
            };
            (account.clone(), crossed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(name: &str) -> AccountId {
        AccountId::new(name)
    }

    #[test]
    fn absorption_is_shared_by_remaining_exposure() {
        let exposures = HashMap::from([
            (account("a"), dec!(130000)),
            (account("b"), dec!(-50000)),
            (account("c"), dec!(-70000)),
        ]);
        let desired = HashMap::from([
            (account("a"), dec!(-100000)),
            (account("b"), dec!(10000)),
            (account("c"), dec!(20000)),
        ]);

        let adjusted = liquidity_adjusted_positions(&exposures, &desired, dec!(-60000));

        // A's remaining exposure (+30k) opposes the -60k change, so A is
        // untouched; B and C split the absorption 40:50.
        assert_eq!(adjusted[&account("a")], dec!(-100000));
        assert_eq!(
            adjusted[&account("b")].round_dp(2),
            dec!(36666.67)
        );
        assert_eq!(
            adjusted[&account("c")].round_dp(2),
            dec!(53333.33)
        );
    }

    #[test]
    fn total_position_shifts_by_exactly_the_change() {
        let exposures = HashMap::from([
            (account("a"), dec!(130000)),
            (account("b"), dec!(-50000)),
            (account("c"), dec!(-70000)),
        ]);
        let desired = HashMap::from([
            (account("a"), dec!(-100000)),
            (account("b"), dec!(10000)),
            (account("c"), dec!(20000)),
        ]);

        let adjusted = liquidity_adjusted_positions(&exposures, &desired, dec!(-60000));

        let before: Decimal = desired.values().sum();
        let after: Decimal = adjusted.values().sum();
        // The 40:50 split is a non-terminating division; compare rounded.
        assert_eq!((after - before).round_dp(2), dec!(60000));
    }

    #[test]
    fn no_matching_exposures_leaves_positions_unchanged() {
        let exposures = HashMap::from([(account("a"), dec!(1000))]);
        let desired = HashMap::from([(account("a"), dec!(-500))]);

        let adjusted = liquidity_adjusted_positions(&exposures, &desired, dec!(-200));

        assert_eq!(adjusted[&account("a")], dec!(-500));
    }

    #[test]
    fn opposing_accounts_cross_to_zero() {
        let desired = HashMap::from([
            (account("a"), dec!(1000)),
            (account("b"), dec!(-1000)),
            (account("c"), dec!(0)),
        ]);
        let crossed = cross_desired_positions(&desired);
        assert_eq!(crossed[&account("a")], Decimal::ZERO);
        assert_eq!(crossed[&account("b")], Decimal::ZERO);
        assert_eq!(crossed[&account("c")], Decimal::ZERO);
    }

    #[test]
    fn crossing_preserves_the_net() {
        let desired = HashMap::from([
            (account("a"), dec!(1000)),
            (account("b"), dec!(-400)),
        ]);
        let crossed = cross_desired_positions(&desired);
        assert_eq!(crossed[&account("a")], dec!(600));
        assert_eq!(crossed[&account("b")], Decimal::ZERO);
        let net: Decimal = crossed.values().sum();
        assert_eq!(net, dec!(600));
    }

    #[test]
    fn one_sided_demand_scales_the_larger_side() {
        let desired = HashMap::from([
            (account("a"), dec!(-600)),
            (account("b"), dec!(-200)),
            (account("c"), dec!(300)),
        ]);
        let crossed = cross_desired_positions(&desired);
        // Net is -500; the short side shrinks pro rata, the long side nets out.
        assert_eq!(crossed[&account("a")], dec!(-375));
        assert_eq!(crossed[&account("b")], dec!(-125));
        assert_eq!(crossed[&account("c")], Decimal::ZERO);
    }

    #[test]
    fn missing_exposure_defaults_to_zero() {
        let exposures = HashMap::new();
        let desired = HashMap::from([(account("a"), dec!(300))]);

        let adjusted = liquidity_adjusted_positions(&exposures, &desired, dec!(300));

        // Remaining exposure is the position itself; the whole change lands
        // on the single account.
        assert_eq!(adjusted[&account("a")], dec!(0));
    }
}
