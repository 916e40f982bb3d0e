//! Buy and sell trade estimators
//!
//! Mirrors the on-chain trade paths: a buy mints complete sets from
//! collateral and swaps every other outcome's sets into the target outcome;
//! a sell works the invariant in the opposite direction, assembling complete
//! sets from one outcome's shares so they can be burned for collateral.

use parlay_core::units::{cash_to_onchain, shares_to_display, shares_to_onchain, trim_display};
use parlay_core::{EngineError, EngineResult, Pool};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::bmath::{calc_in_given_out, calc_out_given_in, max_out_amount};
use crate::estimates::TradeEstimate;
use crate::prices::value_at;

fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Shares received for `collateral_in_raw` of collateral, raw on-chain units.
///
/// The collateral mints `collateral * share_factor` complete sets; each
/// non-target outcome's sets are then swapped into the target outcome, with
/// pool balances updated between swaps exactly as the contract executes
/// them. Output is monotonically non-decreasing in the input amount for a
/// fixed pool state.
pub fn estimate_buy(pool: &Pool, outcome: usize, collateral_in_raw: Decimal) -> EngineResult<Decimal> {
    if outcome >= pool.outcome_count() {
        return Err(EngineError::invalid_input(format!(
            "outcome {} out of range for {}-outcome pool",
            outcome,
            pool.outcome_count()
        )));
    }
    if collateral_in_raw <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive buy amount"));
    }
    if !pool.has_liquidity() {
        return Err(EngineError::no_convergence("pool has no liquidity"));
    }

    let fee = pool.fee_decimal();
    let sets = collateral_in_raw * pool.share_factor;
    let mut balances = pool.balances_raw.clone();
    let mut total_out = sets;

    for i in 0..balances.len() {
        if i == outcome {
            continue;
        }
        let acquired = calc_out_given_in(
            balances[i],
            pool.weights[i],
            balances[outcome],
            pool.weights[outcome],
            sets,
            fee,
        )?;
        balances[i] += sets;
        balances[outcome] -= acquired;
        total_out += acquired;
    }

    Ok(total_out)
}

/// Feasibility cost of assembling `sets` complete sets from shares of one
/// outcome: the sets themselves plus the shares swapped away to buy every
/// other outcome's side. `None` when the pool cannot support the swap.
fn sell_cost(pool: &Pool, outcome: usize, sets: Decimal, fee: Decimal) -> Option<Decimal> {
    let mut cost = sets;
    for j in 0..pool.outcome_count() {
        if j == outcome {
            continue;
        }
        match calc_in_given_out(
            pool.balances_raw[outcome],
            pool.weights[outcome],
            pool.balances_raw[j],
            pool.weights[j],
            sets,
            fee,
        ) {
            Ok(amount_in) => cost += amount_in,
            Err(_) => return None,
        }
    }
    Some(cost)
}

/// Largest number of complete sets (raw share units) that `shares_in_raw`
/// of a single outcome can be converted into.
///
/// Solved by bounded binary search over the invariant; when no positive
/// solution exists (insufficient pool depth) this is
/// [`EngineError::NoConvergence`], never a default zero, so callers can
/// distinguish "no liquidity" from a zero-value trade.
pub fn calc_sell_complete_sets(
    pool: &Pool,
    outcome: usize,
    shares_in_raw: Decimal,
) -> EngineResult<Decimal> {
    if outcome >= pool.outcome_count() {
        return Err(EngineError::invalid_input(format!(
            "outcome {} out of range for {}-outcome pool",
            outcome,
            pool.outcome_count()
        )));
    }
    if shares_in_raw <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive sell amount"));
    }
    if !pool.has_liquidity() {
        return Err(EngineError::no_convergence("pool has no liquidity"));
    }

    let fee = pool.fee_decimal();

    // Each swap extracts from another outcome's balance, so the set count is
    // capped by the shallowest other side as well as by the input shares.
    let depth_cap = pool
        .balances_raw
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != outcome)
        .map(|(_, b)| max_out_amount(*b))
        .min()
        .unwrap_or(Decimal::ZERO);
    let mut hi = shares_in_raw.min(depth_cap).trunc();
    if hi <= Decimal::ZERO {
        return Err(EngineError::no_convergence("insufficient pool depth"));
    }

    if let Some(cost) = sell_cost(pool, outcome, hi, fee) {
        if cost <= shares_in_raw {
            return Ok(hi);
        }
    }

    let mut lo = Decimal::ZERO;
    while hi - lo > Decimal::ONE {
        let mid = ((lo + hi) / Decimal::from(2)).trunc();
        let affordable = sell_cost(pool, outcome, mid, fee)
            .map(|cost| cost <= shares_in_raw)
            .unwrap_or(false);
        if affordable {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if lo.is_zero() {
        return Err(EngineError::no_convergence("insufficient pool depth"));
    }
    Ok(lo)
}

/// Estimate a position entry (buy) with display-ready derived metrics.
pub fn estimate_enter_position(
    pool: &Pool,
    outcome_prices: &[Decimal],
    outcome: usize,
    cash_display: Decimal,
    cash_decimals: u32,
) -> EngineResult<TradeEstimate> {
    if cash_display <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive buy amount"));
    }
    let amount_raw = cash_to_onchain(cash_display, cash_decimals);
    let shares_raw = estimate_buy(pool, outcome, amount_raw)?;
    let estimated_shares = shares_to_display(shares_raw);
    if estimated_shares.is_zero() {
        return Err(EngineError::no_convergence("zero shares out"));
    }

    let trade_fees = cash_display * pool.fee_decimal();
    let average_price = round_dp(cash_display / estimated_shares, 4);
    let max_profit = estimated_shares - cash_display;
    let spot = value_at(outcome_prices, outcome);
    let slippage_percent = if spot.is_zero() {
        Decimal::ZERO
    } else {
        round_dp((average_price - spot) / spot * Decimal::from(100), 4)
    };
    let rate_per_cash = round_dp(estimated_shares / cash_display, 6);

    debug!(%estimated_shares, %slippage_percent, "buy estimate");

    Ok(TradeEstimate {
        output_value: trim_display(estimated_shares),
        trade_fees,
        average_price,
        max_profit: Some(max_profit),
        slippage_percent,
        rate_per_cash,
        remaining_shares: None,
    })
}

/// Estimate a position exit (sell) with display-ready derived metrics.
///
/// `user_balance_display` is the wallet's share balance for the outcome; the
/// remaining-shares figure takes its absolute value to guard against dust
/// rounding below zero.
pub fn estimate_exit_position(
    pool: &Pool,
    outcome_prices: &[Decimal],
    outcome: usize,
    shares_display: Decimal,
    user_balance_display: Decimal,
) -> EngineResult<TradeEstimate> {
    if shares_display <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive sell amount"));
    }
    let shares_raw = shares_to_onchain(shares_display);
    let sets_raw = calc_sell_complete_sets(pool, outcome, shares_raw)?;

    // burned sets convert to collateral at the share factor, which is the
    // same scaling as shares-to-display
    let complete_sets = shares_to_display(sets_raw);
    let trade_fees = shares_display * pool.fee_decimal();
    let average_price = round_dp(complete_sets / shares_display, 2);
    let spot = value_at(outcome_prices, outcome);
    let slippage_percent = if spot.is_zero() {
        Decimal::ZERO
    } else {
        round_dp(
            ((complete_sets / shares_display - spot) / spot * Decimal::from(100)).abs(),
            2,
        )
    };
    let rate_per_cash = round_dp(complete_sets / shares_display, 6);
    let remaining_shares = round_dp((user_balance_display - shares_display).abs(), 6);

    debug!(%complete_sets, %slippage_percent, "sell estimate");

    Ok(TradeEstimate {
        output_value: complete_sets,
        trade_fees,
        average_price,
        max_profit: None,
        slippage_percent,
        rate_per_cash,
        remaining_shares: Some(remaining_shares),
    })
}
