//! Position accounting and portfolio rollups for the Parlay engine
//!
//! Replays an account's immutable transaction log against current pool
//! state to derive cost basis, position valuations, claimable winnings, and
//! portfolio-level totals. Everything here is recomputed from scratch on
//! each refresh; no incremental state is kept between calls.

pub mod activity;
pub mod balances;
pub mod claims;
pub mod cost_basis;
pub mod position;

pub use activity::{last_claim_timestamp, user_transactions, UserActivity};
pub use balances::{compute_user_balances, AccountSnapshot, AmmMarket, MarketShares, UserBalances};
pub use claims::{claimable_winnings, summarize_claims, ClaimEntry, ClaimSummary, ClaimableWinnings};
pub use cost_basis::{position_basis, PositionBasis, SharesAccumulation};
pub use position::{
    lp_current_value, lp_initial_cost, position_usd_values, LpTokenBalance, PositionBalance,
};
