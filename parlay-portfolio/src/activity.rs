//! Account-filtered views of the transaction log

use chrono::{DateTime, Utc};
use parlay_core::{same_address, AllMarketsTransactions, ClaimEvent, LiquidityEvent, TradeEvent};
use std::collections::HashMap;

/// One account's historical activity in one market.
///
/// Buys and sells are split by the indexer sign convention: a buy records
/// negative collateral (cash left the account), a sell positive.
#[derive(Debug, Clone, Default)]
pub struct UserActivity {
    pub buys: Vec<TradeEvent>,
    pub sells: Vec<TradeEvent>,
    pub add_liquidity: Vec<LiquidityEvent>,
    pub remove_liquidity: Vec<LiquidityEvent>,
    pub claimed_proceeds: Vec<ClaimEvent>,
}

/// Filter the full transaction log down to one account, keyed by lowercased
/// market id. Address comparison is case-insensitive throughout.
pub fn user_transactions(
    transactions: &AllMarketsTransactions,
    account: &str,
) -> HashMap<String, UserActivity> {
    transactions
        .iter()
        .map(|(market_id, txs)| {
            let activity = UserActivity {
                buys: txs
                    .trades
                    .iter()
                    .filter(|t| same_address(&t.user, account) && t.is_buy())
                    .cloned()
                    .collect(),
                sells: txs
                    .trades
                    .iter()
                    .filter(|t| same_address(&t.user, account) && !t.is_buy())
                    .cloned()
                    .collect(),
                add_liquidity: txs
                    .add_liquidity
                    .iter()
                    .filter(|t| same_address(&t.sender, account))
                    .cloned()
                    .collect(),
                remove_liquidity: txs
                    .remove_liquidity
                    .iter()
                    .filter(|t| same_address(&t.sender, account))
                    .cloned()
                    .collect(),
                claimed_proceeds: txs
                    .claimed_proceeds
                    .iter()
                    .filter(|c| same_address(&c.receiver, account))
                    .cloned()
                    .collect(),
            };
            (market_id.to_lowercase(), activity)
        })
        .collect()
}

/// The account's most recent claim for an outcome, if any.
///
/// Claims reset the cost basis; buys at or before this instant are excluded
/// from average-price computation.
pub fn last_claim_timestamp(
    claims: &[ClaimEvent],
    outcome: usize,
    account: &str,
) -> Option<DateTime<Utc>> {
    claims
        .iter()
        .filter(|c| same_address(&c.receiver, account) && c.outcome == outcome)
        .map(|c| c.timestamp)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parlay_core::MarketTransactions;
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn trade(user: &str, collateral: rust_decimal::Decimal, secs: i64) -> TradeEvent {
        TradeEvent {
            user: user.to_string(),
            outcome: 0,
            shares: dec!(10),
            collateral,
            price: dec!(0.5),
            timestamp: ts(secs),
        }
    }

    #[test]
    fn test_buys_and_sells_split_by_sign() {
        let mut all = AllMarketsTransactions::new();
        all.insert(
            "0xFactory-1".to_string(),
            MarketTransactions {
                trades: vec![
                    trade("0xAbc", dec!(-5), 1),
                    trade("0xABC", dec!(5), 2),
                    trade("0xother", dec!(-5), 3),
                ],
                ..Default::default()
            },
        );

        let filtered = user_transactions(&all, "0xabc");
        let activity = &filtered["0xfactory-1"];
        assert_eq!(activity.buys.len(), 1);
        assert_eq!(activity.sells.len(), 1);
    }

    #[test]
    fn test_last_claim_takes_latest() {
        let claims = vec![
            ClaimEvent {
                receiver: "0xabc".into(),
                outcome: 0,
                timestamp: ts(100),
            },
            ClaimEvent {
                receiver: "0xabc".into(),
                outcome: 0,
                timestamp: ts(50),
            },
            ClaimEvent {
                receiver: "0xabc".into(),
                outcome: 1,
                timestamp: ts(200),
            },
        ];
        assert_eq!(last_claim_timestamp(&claims, 0, "0xABC"), Some(ts(100)));
        assert_eq!(last_claim_timestamp(&claims, 2, "0xabc"), None);
    }
}
