//! Weighted-pool pricing and estimation for the Parlay engine
//!
//! Implements the Balancer-style weighted constant-product invariant used by
//! the pool contracts: per-outcome price derivation, buy/sell trade
//! estimates, and liquidity add/remove estimates. Every function here is
//! pure fixed-point math over immutable pool snapshots; the one async seam
//! is the [`provider::PoolReader`] trait.

pub mod bmath;
pub mod estimates;
pub mod liquidity;
pub mod prices;
pub mod provider;
pub mod trade;

pub use estimates::{
    AddLiquidityBreakdown, LpExitBreakdown, RemoveLiquidityBreakdown, TradeEstimate,
};
pub use liquidity::{
    burn_sets_breakdown, calc_weights, estimate_add_liquidity, estimate_create_pool,
    estimate_exit_shares, estimate_remove_liquidity, exit_pool_amounts,
};
pub use prices::{calculate_prices, total_liquidity, value_at};
pub use provider::{
    fetch_add_liquidity_estimate, fetch_buy_estimate, fetch_remove_liquidity_estimate,
    fetch_sell_estimate, CancelHandle, CancelToken, PoolReader, SnapshotReader,
};
pub use trade::{calc_sell_complete_sets, estimate_buy, estimate_enter_position, estimate_exit_position};
