//! Core types for the Parlay AMM pricing engine
//!
//! This crate defines the shared data structures used across the engine,
//! including pool snapshots, market definitions, transaction-log entries,
//! and the fixed-point unit conversions the pool contracts assume.

pub mod currency;
pub mod error;
pub mod market;
pub mod pool;
pub mod transactions;
pub mod units;

pub use currency::{Currency, CurrencyBalance};
pub use error::{EngineError, EngineResult};
pub use market::{Market, MarketOutcome, ReportingState, NULL_ADDRESS};
pub use pool::Pool;
pub use transactions::{
    same_address, AllMarketsTransactions, ClaimEvent, LiquidityEvent, MarketTransactions,
    TradeEvent,
};
pub use units::{
    bone, calc_share_factor, cash_to_display, cash_to_onchain, lp_tokens_to_display,
    shares_to_display, shares_to_onchain, trim_display,
};
