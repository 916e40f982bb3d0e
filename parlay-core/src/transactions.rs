//! Historical chain events consumed by the accounting engine
//!
//! Four append-only, immutable categories sourced from an indexer or a
//! batched multicall: trades, liquidity adds, liquidity removes, and claimed
//! proceeds. The engine never owns these; it holds transient views filtered
//! by account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Case-insensitive address equality.
///
/// Indexers and contracts disagree on checksum casing, so every account
/// filter goes through this.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A swap against the pool.
///
/// Indexer sign convention: buys carry negative `collateral` (cash left the
/// account), sells positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Trading account address
    pub user: String,
    /// Outcome index traded
    pub outcome: usize,
    /// Display-unit share amount
    pub shares: Decimal,
    /// Display-unit collateral amount, signed
    pub collateral: Decimal,
    /// Per-share price at execution
    pub price: Decimal,
    /// Timestamp of the trade
    pub timestamp: DateTime<Utc>,
}

impl TradeEvent {
    /// Whether this trade entered a position (spent collateral)
    pub fn is_buy(&self) -> bool {
        self.collateral < Decimal::ZERO
    }
}

/// A liquidity add or remove.
///
/// Liquidity changes implicitly grant or remove outcome shares when the pool
/// is unbalanced; `outcome_shares` records the per-outcome share amounts
/// that landed in the sender's wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityEvent {
    /// Account that added or removed liquidity
    pub sender: String,
    /// Display-unit collateral moved
    pub collateral: Decimal,
    /// LP tokens minted or burned
    pub lp_tokens: Decimal,
    /// Display-unit outcome shares granted to the sender, per outcome
    pub outcome_shares: Vec<Decimal>,
    /// Timestamp of the event
    pub timestamp: DateTime<Utc>,
}

impl LiquidityEvent {
    /// Shares granted for one outcome; missing entries coerce to zero.
    pub fn shares_for(&self, outcome: usize) -> Decimal {
        self.outcome_shares
            .get(outcome)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Proceeds claimed from a finalized market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvent {
    /// Account that received the proceeds
    pub receiver: String,
    /// Winning outcome claimed
    pub outcome: usize,
    /// Timestamp of the claim
    pub timestamp: DateTime<Utc>,
}

/// All historical events for one market
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketTransactions {
    pub trades: Vec<TradeEvent>,
    pub add_liquidity: Vec<LiquidityEvent>,
    pub remove_liquidity: Vec<LiquidityEvent>,
    pub claimed_proceeds: Vec<ClaimEvent>,
}

/// Transaction logs keyed by market id
pub type AllMarketsTransactions = HashMap<String, MarketTransactions>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_same_address_ignores_case() {
        assert!(same_address("0xAbCd", "0xabcd"));
        assert!(!same_address("0xabcd", "0xabce"));
    }

    #[test]
    fn test_trade_direction() {
        let buy = TradeEvent {
            user: "0x1".into(),
            outcome: 0,
            shares: dec!(10),
            collateral: dec!(-3),
            price: dec!(0.3),
            timestamp: DateTime::UNIX_EPOCH,
        };
        assert!(buy.is_buy());
    }

    #[test]
    fn test_missing_outcome_shares_coerce_to_zero() {
        let event = LiquidityEvent {
            sender: "0x1".into(),
            collateral: dec!(5),
            lp_tokens: dec!(1),
            outcome_shares: vec![dec!(2)],
            timestamp: DateTime::UNIX_EPOCH,
        };
        assert_eq!(event.shares_for(0), dec!(2));
        assert_eq!(event.shares_for(3), Decimal::ZERO);
    }
}
