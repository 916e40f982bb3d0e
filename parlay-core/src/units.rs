//! Fixed-point unit conversions
//!
//! The pool contracts keep every amount as an 18-decimal fixed-point
//! integer; collateral tokens keep their own decimals (6 for USDC). All
//! conversions stay in `Decimal` so no precision is lost before display
//! formatting.

use rust_decimal::{Decimal, RoundingStrategy};

/// Share tokens and LP tokens are 18 decimal places on chain.
pub const SHARE_DECIMALS: u32 = 18;

/// 1e18, the fixed-point base the pool contracts compute in.
pub fn bone() -> Decimal {
    Decimal::from(1_000_000_000_000_000_000_u64)
}

fn pow10(exp: u32) -> Decimal {
    Decimal::from(10_u64.pow(exp))
}

/// Scaling constant converting collateral amounts to share amounts.
///
/// `max(1, 10^(18 - collateral_decimals))`: one unit of collateral mints
/// `share_factor` complete-set shares.
pub fn calc_share_factor(collateral_decimals: u32) -> Decimal {
    let exp = SHARE_DECIMALS.saturating_sub(collateral_decimals);
    if exp == 0 {
        Decimal::ONE
    } else {
        pow10(exp)
    }
}

/// On-chain cash amount to display units.
pub fn cash_to_display(raw: Decimal, decimals: u32) -> Decimal {
    raw / pow10(decimals)
}

/// Display cash amount to on-chain integer units (truncated).
pub fn cash_to_onchain(display: Decimal, decimals: u32) -> Decimal {
    (display * pow10(decimals)).trunc()
}

/// On-chain share amount to display units.
pub fn shares_to_display(raw: Decimal) -> Decimal {
    raw / pow10(SHARE_DECIMALS)
}

/// Display share amount to on-chain integer units (truncated).
pub fn shares_to_onchain(display: Decimal) -> Decimal {
    (display * pow10(SHARE_DECIMALS)).trunc()
}

/// On-chain LP token amount to display units (18 decimals, same as shares).
pub fn lp_tokens_to_display(raw: Decimal) -> Decimal {
    raw / pow10(SHARE_DECIMALS)
}

/// Trim a display amount to 6 decimal places, half-up.
pub fn trim_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}
