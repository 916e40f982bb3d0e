//! Liquidity add/remove estimators
//!
//! Pool creation weights come from the initial outcome prices; deposits into
//! an existing pool mint complete sets and join proportionally, with the
//! join ratio limited by the deepest outcome balance; withdrawals exit
//! proportionally and burn the min-across-outcomes as complete sets for
//! collateral.

use parlay_core::units::{
    cash_to_display, cash_to_onchain, lp_tokens_to_display, shares_to_onchain, trim_display,
};
use parlay_core::{EngineError, EngineResult, Pool};
use rust_decimal::Decimal;
use tracing::debug;

use crate::estimates::{AddLiquidityBreakdown, LpExitBreakdown, RemoveLiquidityBreakdown};

/// Normalization constant for pool-creation weights: weights sum to 50e18.
pub const TOTAL_WEIGHT: u32 = 50;

/// Fixed LP issuance when a pool is created (100 tokens at 18 decimals).
pub fn initial_lp_supply_raw() -> Decimal {
    Decimal::from(100) * parlay_core::units::bone()
}

/// Pool-creation weights from initial outcome prices.
///
/// `weight[i] = price[i] * TOTAL_WEIGHT * 1e18`. Prices must sum to one;
/// anything else would create a mispriced pool, so it is rejected rather
/// than normalized silently.
pub fn calc_weights(prices: &[Decimal]) -> EngineResult<Vec<Decimal>> {
    if prices.is_empty() {
        return Err(EngineError::invalid_input("no outcome prices"));
    }
    let sum: Decimal = prices.iter().sum();
    if (sum - Decimal::ONE).abs() > Decimal::new(1, 6) {
        return Err(EngineError::invalid_input(format!(
            "outcome prices sum to {} instead of 1",
            sum
        )));
    }
    let multiplier = Decimal::from(TOTAL_WEIGHT) * parlay_core::units::bone();
    Ok(prices.iter().map(|p| p * multiplier).collect())
}

/// Estimate LP tokens for creating a new pool.
pub fn estimate_create_pool(
    cash_display: Decimal,
    outcome_prices: &[Decimal],
) -> EngineResult<AddLiquidityBreakdown> {
    if cash_display <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive deposit"));
    }
    // validates the prices even though creation mints a fixed supply
    let weights = calc_weights(outcome_prices)?;
    debug!(?weights, %cash_display, "create pool estimate");
    Ok(AddLiquidityBreakdown {
        lp_tokens: trim_display(lp_tokens_to_display(initial_lp_supply_raw())),
        shares_back: vec![Decimal::ZERO; outcome_prices.len()],
    })
}

/// Estimate LP tokens minted by a deposit into an existing pool.
///
/// The deposit mints `cash * share_factor` complete sets; the pool absorbs
/// them at the ratio set by its deepest balance and the depositor keeps the
/// leftover shares of every shallower outcome.
pub fn estimate_add_liquidity(
    pool: &Pool,
    cash_display: Decimal,
    cash_decimals: u32,
) -> EngineResult<AddLiquidityBreakdown> {
    if cash_display <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive deposit"));
    }
    if !pool.has_liquidity() {
        return Err(EngineError::no_convergence("pool has no liquidity"));
    }
    let max_balance = pool
        .balances_raw
        .iter()
        .copied()
        .max()
        .unwrap_or(Decimal::ZERO);
    if max_balance.is_zero() {
        return Err(EngineError::malformed("pool has zero balances"));
    }

    let sets = cash_to_onchain(cash_display, cash_decimals) * pool.share_factor;
    let ratio = sets / max_balance;
    let lp_raw = (ratio * pool.total_supply).trunc();
    let shares_back = pool
        .balances_raw
        .iter()
        .map(|b| parlay_core::units::shares_to_display((sets - ratio * b).trunc()))
        .collect();

    Ok(AddLiquidityBreakdown {
        lp_tokens: trim_display(lp_tokens_to_display(lp_raw)),
        shares_back,
    })
}

/// Proportional pool-exit amounts for `lp_tokens_raw`, raw units per
/// outcome. This is the zero-minimum estimate-mode exit; no sets are burned.
pub fn exit_pool_amounts(pool: &Pool, lp_tokens_raw: Decimal) -> EngineResult<Vec<Decimal>> {
    if lp_tokens_raw <= Decimal::ZERO {
        return Err(EngineError::invalid_input("non-positive LP amount"));
    }
    if !pool.has_liquidity() {
        return Err(EngineError::no_convergence("pool has no liquidity"));
    }
    if lp_tokens_raw > pool.total_supply {
        return Err(EngineError::invalid_input(
            "LP amount exceeds outstanding supply",
        ));
    }
    let ratio = lp_tokens_raw / pool.total_supply;
    Ok(pool
        .balances_raw
        .iter()
        .map(|b| (b * ratio).trunc())
        .collect())
}

/// Estimate the shares a display-unit LP balance redeems for.
pub fn estimate_exit_shares(pool: &Pool, lp_display: Decimal) -> EngineResult<LpExitBreakdown> {
    let lp_raw = shares_to_onchain(lp_display);
    let amounts = exit_pool_amounts(pool, lp_raw)?;
    Ok(LpExitBreakdown {
        min_amounts: amounts
            .iter()
            .map(|a| lp_tokens_to_display(*a))
            .collect(),
        min_amounts_raw: amounts,
    })
}

/// Turn raw pool-exit amounts into a withdrawal breakdown: the
/// min-across-outcomes is burned as complete sets for collateral and the
/// residual per-outcome shares become the true minimum-out bounds for the
/// real call.
pub fn burn_sets_breakdown(
    exit_amounts: &[Decimal],
    share_factor: Decimal,
    cash_decimals: u32,
) -> EngineResult<RemoveLiquidityBreakdown> {
    if share_factor.is_zero() {
        return Err(EngineError::malformed("zero share factor"));
    }
    let sets = exit_amounts.iter().copied().min().unwrap_or(Decimal::ZERO);
    let collateral_raw = (sets / share_factor).trunc();
    let residual: Vec<Decimal> = exit_amounts.iter().map(|a| a - sets).collect();

    Ok(RemoveLiquidityBreakdown {
        min_amounts: residual
            .iter()
            .map(|a| lp_tokens_to_display(*a))
            .collect(),
        min_amounts_raw: residual,
        cash_amount: cash_to_display(collateral_raw, cash_decimals),
    })
}

/// Estimate a liquidity withdrawal: proportional exit, then the burned-set
/// conversion of [`burn_sets_breakdown`].
pub fn estimate_remove_liquidity(
    pool: &Pool,
    lp_display: Decimal,
    cash_decimals: u32,
) -> EngineResult<RemoveLiquidityBreakdown> {
    let lp_raw = shares_to_onchain(lp_display);
    let amounts = exit_pool_amounts(pool, lp_raw)?;
    debug!(%lp_display, "remove liquidity estimate");
    burn_sets_breakdown(&amounts, pool.share_factor, cash_decimals)
}
