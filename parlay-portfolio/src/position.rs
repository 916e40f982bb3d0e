//! Position and LP-token valuation

use parlay_amm::LpExitBreakdown;
use parlay_core::units::trim_display;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::activity::UserActivity;
use crate::cost_basis::position_basis;

/// Negative changes above this threshold are rounding noise from the
/// fixed-point chains, not losses; they are flipped positive.
// TODO: replace with a relative-epsilon comparison instead of an absolute cutoff
pub fn dust_change_tolerance() -> Decimal {
    Decimal::new(-1, 3) // -0.001
}

/// A user's derived economic exposure to one outcome of one market.
///
/// Recomputed from scratch on every balance refresh; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionBalance {
    /// Outcome index within the market
    pub outcome_id: usize,

    /// Outcome display name
    pub outcome_name: String,

    /// Current share count, display units
    pub balance: Decimal,

    /// Current share count, raw on-chain units
    pub raw_balance: Decimal,

    /// Display quantity trimmed to 6 decimals
    pub quantity: Decimal,

    /// Mark-to-market value in USD
    pub usd_value: Decimal,

    /// Value 24 hours ago, when a historical price is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past24hr_usd_value: Option<Decimal>,

    /// Change vs 24 hours ago
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24hr_usd: Option<Decimal>,

    /// Unrealized change vs cost basis
    pub total_change_usd: Decimal,

    /// Volume-weighted average entry price
    pub avg_price: Decimal,

    /// Cost basis in USD (avg price x quantity)
    pub init_cost_usd: Decimal,

    /// Value if the outcome resolves as the winner
    pub max_usd_value: Decimal,

    pub visible: bool,

    /// Position partly sourced from adding liquidity
    pub position_from_liquidity: bool,

    /// Position partly sourced from removing liquidity
    pub position_from_remove_liquidity: bool,
}

/// Value one outcome balance against the current price and the account's
/// replayed cost basis. A zero balance is no position (`None`).
#[allow(clippy::too_many_arguments)]
pub fn position_usd_values(
    activity: &UserActivity,
    account: &str,
    raw_balance: Decimal,
    balance: Decimal,
    outcome: usize,
    outcome_name: &str,
    price: Decimal,
    cash_usd_price: Decimal,
    past24hr_price: Option<Decimal>,
) -> Option<PositionBalance> {
    if balance.is_zero() {
        return None;
    }

    let quantity = trim_display(balance);
    let max_usd_value = balance * cash_usd_price;
    let usd_value = balance * price * cash_usd_price;

    let basis = position_basis(activity, outcome, account);
    let avg_price = trim_display(basis.avg_price);
    let init_cost_usd = (basis.avg_price * quantity)
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);

    let mut usd_changed = usd_value - init_cost_usd;
    // ignore negative dust difference
    if usd_changed < Decimal::ZERO && usd_changed > dust_change_tolerance() {
        usd_changed = usd_changed.abs();
    }

    let past24hr_usd_value = past24hr_price.map(|p| balance * p * cash_usd_price);
    let change_24hr_usd = past24hr_usd_value.map(|past| usd_value - past);

    Some(PositionBalance {
        outcome_id: outcome,
        outcome_name: outcome_name.to_string(),
        balance,
        raw_balance,
        quantity,
        usd_value,
        past24hr_usd_value,
        change_24hr_usd,
        total_change_usd: trim_display(usd_changed),
        avg_price,
        init_cost_usd,
        max_usd_value,
        visible: true,
        position_from_liquidity: !basis.position_from_remove_liquidity
            && basis.position_from_liquidity,
        position_from_remove_liquidity: basis.position_from_remove_liquidity,
    })
}

/// An account's LP token holding in one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpTokenBalance {
    /// Display-unit LP balance
    pub balance: Decimal,

    /// Raw on-chain LP balance
    pub raw_balance: Decimal,

    /// Net cash put in: liquidity added minus liquidity removed
    pub init_cost_usd: Decimal,

    /// Current redemption value; `None` when the pool cannot be priced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_value: Option<Decimal>,
}

/// Net cash the account has committed as liquidity: adds minus removes.
pub fn lp_initial_cost(activity: &UserActivity) -> Decimal {
    let added: Decimal = activity
        .add_liquidity
        .iter()
        .map(|e| e.collateral.abs())
        .sum();
    let removed: Decimal = activity
        .remove_liquidity
        .iter()
        .map(|e| e.collateral.abs())
        .sum();
    added - removed
}

/// Value an LP holding from its exit estimate: each outcome's redeemable
/// shares at its current price, marked to USD. `None` when prices are
/// unknown (pool not created or mispriced snapshot).
pub fn lp_current_value(
    exit: &LpExitBreakdown,
    outcome_prices: &[Decimal],
    cash_usd_price: Decimal,
) -> Option<Decimal> {
    if outcome_prices.is_empty() || exit.min_amounts.is_empty() {
        return None;
    }
    let total: Decimal = exit
        .min_amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| amount * parlay_amm::value_at(outcome_prices, i))
        .sum();
    Some(total * cash_usd_price)
}
