//! Claimable winnings across finalized markets

use parlay_core::{Currency, Market};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::position::PositionBalance;

/// Winnings an account can withdraw from one finalized market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimableWinnings {
    /// Withdrawable value, 4 decimal places
    pub claimable_balance: Decimal,

    /// The account's raw share balances per outcome, needed to build the
    /// on-chain claim call
    pub user_balances: Vec<Decimal>,
}

/// Compute the claimable winnings for one market, if any.
///
/// Only a finalized market with a determined winner and a positive raw
/// balance in the winning outcome yields winnings. The claimable balance is
/// the position's current value less its cost basis (absolute, 4 decimals).
pub fn claimable_winnings(
    market: &Market,
    positions: &[PositionBalance],
    outcome_shares_raw: &[Decimal],
) -> Option<ClaimableWinnings> {
    let winner = market.winner?;
    if !market.is_finalized() {
        return None;
    }
    let position = positions.iter().find(|p| p.outcome_id == winner)?;
    if position.raw_balance <= Decimal::ZERO {
        return None;
    }

    let claimable_balance = (position.usd_value - position.init_cost_usd)
        .abs()
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);

    debug!(market_id = %market.market_id, %claimable_balance, "claimable winnings");

    Some(ClaimableWinnings {
        claimable_balance,
        user_balances: outcome_shares_raw.to_vec(),
    })
}

/// One market's contribution to the batched claim call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub currency: Currency,
    pub market_id: String,
    pub factory_address: String,
    pub claimable_balance: Decimal,
}

/// Per-currency rollup of everything claimable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub has_winnings: bool,
    pub total: Decimal,
    /// Market ids for the batched claim call
    pub market_ids: Vec<String>,
    /// Factory addresses, one per market (multiple factories may be live)
    pub factories: Vec<String>,
}

/// Aggregate claim entries into per-currency totals.
pub fn summarize_claims(entries: &[ClaimEntry]) -> HashMap<Currency, ClaimSummary> {
    let mut summaries: HashMap<Currency, ClaimSummary> = HashMap::new();
    for entry in entries {
        let summary = summaries.entry(entry.currency).or_default();
        summary.has_winnings = true;
        summary.total += entry.claimable_balance;
        summary.market_ids.push(entry.market_id.clone());
        summary.factories.push(entry.factory_address.clone());
    }
    summaries
}
