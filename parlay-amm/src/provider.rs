//! Async pool-state access and cancellation
//!
//! Every pricing function in this crate is synchronous; the only suspension
//! points in the engine are the pool-state reads behind [`PoolReader`].
//! Estimates are read-only and best-effort: a failed read maps to
//! [`EngineError::Unavailable`] immediately, with no retries. Callers that
//! abandon a refresh (e.g. a view unmounting) trip the [`CancelHandle`] and
//! in-flight estimates resolve to [`EngineError::Cancelled`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::debug;

use parlay_core::{EngineError, EngineResult, Pool};

use crate::estimates::{AddLiquidityBreakdown, RemoveLiquidityBreakdown, TradeEstimate};
use crate::liquidity;
use crate::trade;

/// Read-only access to pool state.
///
/// Implementations wrap whatever data source is available: a batched
/// multicall against the chain or an indexer query. The engine treats them
/// as interchangeable; availability selects between them.
#[async_trait]
pub trait PoolReader: Send + Sync {
    /// Current pool snapshot for a market.
    async fn pool(&self, market_id: &str) -> EngineResult<Pool>;

    /// The pool's exit calculation for an LP token amount, raw units per
    /// outcome. Minimum-out bounds of zero put the call in estimate mode.
    async fn calc_exit_pool(
        &self,
        market_id: &str,
        lp_tokens_raw: Decimal,
        min_amounts_out: &[Decimal],
    ) -> EngineResult<Vec<Decimal>>;
}

/// Cancellation signal handed to in-flight estimates.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// A token that can never be cancelled, for fire-and-forget callers.
    pub fn never() -> Self {
        // a dropped sender leaves the last value in place, which is never true
        let (_tx, rx) = watch::channel(false);
        CancelToken { rx }
    }
}

/// Owner side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx })
    }

    /// Trip the signal; every clone of the token observes it.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

fn check_cancelled(cancel: &CancelToken) -> EngineResult<()> {
    if cancel.is_cancelled() {
        Err(EngineError::Cancelled)
    } else {
        Ok(())
    }
}

/// In-memory [`PoolReader`] over a fixed set of pool snapshots.
///
/// Backs tests and the local estimate path when a fresh multicall snapshot
/// is already in hand.
#[derive(Debug, Default)]
pub struct SnapshotReader {
    pools: HashMap<String, Pool>,
}

impl SnapshotReader {
    pub fn new(pools: HashMap<String, Pool>) -> Self {
        Self { pools }
    }

    pub fn insert(&mut self, market_id: impl Into<String>, pool: Pool) {
        self.pools.insert(market_id.into(), pool);
    }
}

#[async_trait]
impl PoolReader for SnapshotReader {
    async fn pool(&self, market_id: &str) -> EngineResult<Pool> {
        self.pools
            .get(market_id)
            .cloned()
            .ok_or_else(|| EngineError::unavailable(format!("no pool snapshot for {}", market_id)))
    }

    async fn calc_exit_pool(
        &self,
        market_id: &str,
        lp_tokens_raw: Decimal,
        _min_amounts_out: &[Decimal],
    ) -> EngineResult<Vec<Decimal>> {
        let pool = self.pool(market_id).await?;
        liquidity::exit_pool_amounts(&pool, lp_tokens_raw)
    }
}

/// Fetch fresh pool state and estimate a buy.
pub async fn fetch_buy_estimate(
    reader: &dyn PoolReader,
    cancel: &CancelToken,
    market_id: &str,
    outcome_prices: &[Decimal],
    outcome: usize,
    cash_display: Decimal,
    cash_decimals: u32,
) -> EngineResult<TradeEstimate> {
    check_cancelled(cancel)?;
    let pool = reader.pool(market_id).await?;
    check_cancelled(cancel)?;
    trade::estimate_enter_position(&pool, outcome_prices, outcome, cash_display, cash_decimals)
}

/// Fetch fresh pool state and estimate a sell.
pub async fn fetch_sell_estimate(
    reader: &dyn PoolReader,
    cancel: &CancelToken,
    market_id: &str,
    outcome_prices: &[Decimal],
    outcome: usize,
    shares_display: Decimal,
    user_balance_display: Decimal,
) -> EngineResult<TradeEstimate> {
    check_cancelled(cancel)?;
    let pool = reader.pool(market_id).await?;
    check_cancelled(cancel)?;
    trade::estimate_exit_position(
        &pool,
        outcome_prices,
        outcome,
        shares_display,
        user_balance_display,
    )
}

/// Fetch fresh pool state and estimate an add-liquidity.
///
/// An uncreated pool (no address yet) estimates the creation path, which
/// needs the initial outcome prices; an existing pool ignores them.
pub async fn fetch_add_liquidity_estimate(
    reader: &dyn PoolReader,
    cancel: &CancelToken,
    market_id: &str,
    cash_display: Decimal,
    cash_decimals: u32,
    initial_prices: &[Decimal],
) -> EngineResult<AddLiquidityBreakdown> {
    check_cancelled(cancel)?;
    let pool = reader.pool(market_id).await?;
    check_cancelled(cancel)?;
    if pool.address.is_none() || !pool.has_liquidity() {
        debug!(%market_id, "estimating pool creation");
        liquidity::estimate_create_pool(cash_display, initial_prices)
    } else {
        liquidity::estimate_add_liquidity(&pool, cash_display, cash_decimals)
    }
}

/// Fetch fresh pool state and estimate a remove-liquidity via the pool's
/// exit calculation in estimate mode (all-zero minimums).
pub async fn fetch_remove_liquidity_estimate(
    reader: &dyn PoolReader,
    cancel: &CancelToken,
    market_id: &str,
    lp_display: Decimal,
    cash_decimals: u32,
) -> EngineResult<RemoveLiquidityBreakdown> {
    check_cancelled(cancel)?;
    let pool = reader.pool(market_id).await?;
    check_cancelled(cancel)?;

    let lp_raw = parlay_core::units::shares_to_onchain(lp_display);
    let zero_mins = vec![Decimal::ZERO; pool.outcome_count()];
    let amounts = reader.calc_exit_pool(market_id, lp_raw, &zero_mins).await?;
    check_cancelled(cancel)?;

    liquidity::burn_sets_breakdown(&amounts, pool.share_factor, cash_decimals)
}
