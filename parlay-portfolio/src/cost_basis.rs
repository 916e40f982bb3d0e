//! Weighted-average cost basis from replayed transactions
//!
//! Positions carry no stored basis; it is recomputed on every refresh by
//! replaying the filtered log in ascending timestamp order. The recurrence
//! is order-dependent, so the ordering is enforced here rather than assumed
//! of the indexer.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use parlay_core::{LiquidityEvent, TradeEvent};
use rust_decimal::Decimal;

use crate::activity::{last_claim_timestamp, UserActivity};

/// Running accumulation of shares, cash, and weighted average price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharesAccumulation {
    pub shares: Decimal,
    pub cash: Decimal,
    pub avg_price: Decimal,
}

/// Derived cost basis for one (market, outcome, account).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionBasis {
    /// Volume-weighted average entry price across buys and LP share grants
    pub avg_price: Decimal,
    /// Some of the position came from adding liquidity
    pub position_from_liquidity: bool,
    /// Some of the position came from removing liquidity
    pub position_from_remove_liquidity: bool,
}

fn after_cutoff(timestamp: DateTime<Utc>, cutoff: Option<DateTime<Utc>>) -> bool {
    match cutoff {
        Some(cut) => timestamp > cut,
        None => true,
    }
}

/// Accumulate buys of one outcome into a running weighted average price.
///
/// `avg_new = (cash_old * avg_old + |collateral| * price) / (cash_old + |collateral|)`
///
/// Buys at or before `cutoff` (the last claim) are excluded: claiming
/// proceeds closes the position for average-cost purposes.
pub fn accumulate_trade_basis(
    buys: &[TradeEvent],
    outcome: usize,
    cutoff: Option<DateTime<Utc>>,
) -> SharesAccumulation {
    let mut acc = SharesAccumulation::default();
    for trade in buys
        .iter()
        .filter(|t| t.outcome == outcome && after_cutoff(t.timestamp, cutoff))
        .sorted_by_key(|t| t.timestamp)
    {
        let cash = trade.collateral.abs();
        let denominator = acc.cash + cash;
        if denominator.is_zero() {
            continue;
        }
        acc.avg_price = (acc.cash * acc.avg_price + cash * trade.price) / denominator;
        acc.shares += trade.shares;
        acc.cash += cash;
    }
    acc
}

/// Accumulate shares and cash attributable to liquidity events for one
/// outcome. The average price is derived by the caller from the totals.
pub fn accumulate_liquidity_basis(
    events: &[LiquidityEvent],
    outcome: usize,
    cutoff: Option<DateTime<Utc>>,
) -> SharesAccumulation {
    let mut acc = SharesAccumulation::default();
    for event in events
        .iter()
        .filter(|e| after_cutoff(e.timestamp, cutoff))
        .sorted_by_key(|e| e.timestamp)
    {
        acc.shares += event.shares_for(outcome);
        acc.cash += event.collateral.abs();
    }
    acc
}

/// Compute the blended cost basis for one outcome of one market.
///
/// Trade-derived and liquidity-derived average prices are blended, weighted
/// by each source's share count. Idempotent: the same log and balances
/// always produce the same output.
pub fn position_basis(activity: &UserActivity, outcome: usize, account: &str) -> PositionBasis {
    let cutoff = last_claim_timestamp(&activity.claimed_proceeds, outcome, account);

    let entered = accumulate_trade_basis(&activity.buys, outcome, cutoff);
    let adds = accumulate_liquidity_basis(&activity.add_liquidity, outcome, cutoff);
    let removes = accumulate_liquidity_basis(&activity.remove_liquidity, outcome, cutoff);

    let liquidity_shares = adds.shares + removes.shares;
    let liquidity_cash = adds.cash + removes.cash;
    let avg_price_liquidity = if liquidity_shares > Decimal::ZERO {
        liquidity_cash / liquidity_shares
    } else {
        Decimal::ZERO
    };

    let total_shares = liquidity_shares + entered.shares;
    let avg_price = if total_shares > Decimal::ZERO {
        avg_price_liquidity * liquidity_shares / total_shares
            + entered.avg_price * entered.shares / total_shares
    } else {
        Decimal::ZERO
    };

    PositionBasis {
        avg_price,
        position_from_liquidity: adds.shares > Decimal::ZERO,
        position_from_remove_liquidity: removes.shares > Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parlay_core::ClaimEvent;
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn buy(shares: Decimal, collateral: Decimal, price: Decimal, secs: i64) -> TradeEvent {
        TradeEvent {
            user: "0xabc".into(),
            outcome: 0,
            shares,
            collateral,
            price,
            timestamp: ts(secs),
        }
    }

    #[test]
    fn test_weighted_average_recurrence() {
        // two buys: (cash 3 @ 0.3) then (cash 4 @ 0.4)
        // avg = (3*0.3 + 4*0.4) / (3+4)
        let buys = vec![buy(dec!(10), dec!(-3), dec!(0.3), 1), buy(dec!(10), dec!(-4), dec!(0.4), 2)];
        let acc = accumulate_trade_basis(&buys, 0, None);
        assert_eq!(acc.shares, dec!(20));
        assert_eq!(acc.cash, dec!(7));
        assert_eq!(
            acc.avg_price.round_dp(4),
            (dec!(2.5) / dec!(7)).round_dp(4)
        );
    }

    #[test]
    fn test_recurrence_is_order_dependent_so_replay_sorts() {
        // same events delivered out of order must accumulate identically
        let ordered = vec![buy(dec!(10), dec!(-3), dec!(0.3), 1), buy(dec!(10), dec!(-4), dec!(0.4), 2)];
        let shuffled = vec![buy(dec!(10), dec!(-4), dec!(0.4), 2), buy(dec!(10), dec!(-3), dec!(0.3), 1)];
        assert_eq!(
            accumulate_trade_basis(&ordered, 0, None),
            accumulate_trade_basis(&shuffled, 0, None)
        );
    }

    #[test]
    fn test_accumulation_is_idempotent() {
        // two runs over the same immutable log are bit-identical
        let activity = UserActivity {
            buys: vec![buy(dec!(10), dec!(-3), dec!(0.3), 1), buy(dec!(10), dec!(-4), dec!(0.4), 2)],
            ..Default::default()
        };
        let first = position_basis(&activity, 0, "0xabc");
        let second = position_basis(&activity, 0, "0xabc");
        assert_eq!(first, second);
    }

    #[test]
    fn test_claim_resets_basis() {
        // a claim strictly after the first buy excludes it
        let activity = UserActivity {
            buys: vec![buy(dec!(10), dec!(-3), dec!(0.3), 1), buy(dec!(10), dec!(-4), dec!(0.4), 10)],
            claimed_proceeds: vec![ClaimEvent {
                receiver: "0xabc".into(),
                outcome: 0,
                timestamp: ts(5),
            }],
            ..Default::default()
        };
        let basis = position_basis(&activity, 0, "0xabc");
        assert_eq!(basis.avg_price, dec!(0.4));
    }

    #[test]
    fn test_claim_for_other_outcome_does_not_reset() {
        let activity = UserActivity {
            buys: vec![buy(dec!(10), dec!(-3), dec!(0.3), 1)],
            claimed_proceeds: vec![ClaimEvent {
                receiver: "0xabc".into(),
                outcome: 1,
                timestamp: ts(5),
            }],
            ..Default::default()
        };
        let basis = position_basis(&activity, 0, "0xabc");
        assert_eq!(basis.avg_price, dec!(0.3));
    }

    #[test]
    fn test_liquidity_shares_blend_into_average() {
        // 20 trade shares at avg 0.5 plus 10 LP-granted shares costing 2
        // cash: blended avg = 0.5*(20/30) + 0.2*(10/30)
        let activity = UserActivity {
            buys: vec![buy(dec!(20), dec!(-10), dec!(0.5), 1)],
            add_liquidity: vec![LiquidityEvent {
                sender: "0xabc".into(),
                collateral: dec!(-2),
                lp_tokens: dec!(1),
                outcome_shares: vec![dec!(10), dec!(0)],
                timestamp: ts(2),
            }],
            ..Default::default()
        };
        let basis = position_basis(&activity, 0, "0xabc");
        let expected = dec!(0.2) * dec!(10) / dec!(30) + dec!(0.5) * dec!(20) / dec!(30);
        assert_eq!(basis.avg_price.round_dp(6), expected.round_dp(6));
        assert!(basis.position_from_liquidity);
        assert!(!basis.position_from_remove_liquidity);
    }

    #[test]
    fn test_empty_log_is_zero_basis() {
        let basis = position_basis(&UserActivity::default(), 0, "0xabc");
        assert_eq!(basis.avg_price, Decimal::ZERO);
    }
}
