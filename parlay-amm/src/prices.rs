//! Per-outcome price derivation from pool token ratios

use parlay_core::units::cash_to_display;
use rust_decimal::{Decimal, RoundingStrategy};

/// Read one entry of an on-chain array result; missing entries coerce to
/// zero rather than erroring.
pub fn value_at(values: &[Decimal], index: usize) -> Decimal {
    values.get(index).copied().unwrap_or(Decimal::ZERO)
}

/// Derive per-outcome prices from pool token ratios.
///
/// `price[i] = base[i] / sum(base)` where the base is the reported ratios,
/// falling back to the pool weights when the factory returned no ratios. An
/// empty or all-zero base yields an empty vector: price unknown, not zero.
pub fn calculate_prices(ratios: &[Decimal], weights: &[Decimal]) -> Vec<Decimal> {
    let base = if !ratios.is_empty() { ratios } else { weights };
    if base.is_empty() {
        return Vec::new();
    }
    let sum: Decimal = base.iter().sum();
    if sum.is_zero() {
        return Vec::new();
    }
    base.iter().map(|r| r / sum).collect()
}

/// Total pool liquidity in collateral terms, 4 decimal places.
///
/// Sums each outcome's balance valued at its price. Empty prices (pool not
/// created) value to zero; a zero-balance pool values to "0.0000" rather
/// than erroring.
pub fn total_liquidity(prices: &[Decimal], balances_raw: &[Decimal]) -> Decimal {
    if prices.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = prices
        .iter()
        .enumerate()
        .map(|(i, p)| p * cash_to_display(value_at(balances_raw, i), 18))
        .sum();
    let mut total = total.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    total.rescale(4);
    total
}
