//! Estimate value objects returned across the engine boundary
//!
//! All fields are `Decimal`, which serde serializes as decimal strings so
//! callers can hand amounts straight back as transaction parameters without
//! floating-point loss.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of a buy or sell trade estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEstimate {
    /// Shares out (buy) or collateral out (sell), display units
    pub output_value: Decimal,

    /// Fee charged on the trade, display units
    pub trade_fees: Decimal,

    /// Effective per-share price of the whole trade
    pub average_price: Decimal,

    /// Maximum profit if the outcome resolves favorably (buys only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_profit: Option<Decimal>,

    /// Percent deviation of the average price from the spot price
    pub slippage_percent: Decimal,

    /// Output units received per input unit
    pub rate_per_cash: Decimal,

    /// Shares left in the wallet after a sell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_shares: Option<Decimal>,
}

/// Result of an add-liquidity / create-pool estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityBreakdown {
    /// LP tokens minted, display units
    pub lp_tokens: Decimal,

    /// Outcome shares returned to the depositor when the pool is
    /// unbalanced, display units per outcome
    pub shares_back: Vec<Decimal>,
}

/// Result of a remove-liquidity estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveLiquidityBreakdown {
    /// Residual per-outcome shares after burning complete sets, display
    /// units; these are the true minimum-out bounds for the real call
    pub min_amounts: Vec<Decimal>,

    /// Same amounts in raw on-chain units
    pub min_amounts_raw: Vec<Decimal>,

    /// Collateral returned from the burned sets, display units
    pub cash_amount: Decimal,
}

/// Proportional pool-exit amounts for an LP token balance (no set burning)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpExitBreakdown {
    /// Per-outcome share amounts, display units
    pub min_amounts: Vec<Decimal>,

    /// Same amounts in raw on-chain units
    pub min_amounts_raw: Vec<Decimal>,
}
