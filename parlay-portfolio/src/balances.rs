//! Portfolio rollup across markets
//!
//! `compute_user_balances` is the top of the pipeline: it takes an immutable
//! [`AccountSnapshot`] (pool/market/balance state captured by one refresh
//! cycle) and replays the account's transaction log into positions, LP
//! valuations, claimable winnings, and portfolio totals. The snapshot is an
//! explicit parameter; there is no module-level state.

use parlay_core::units::{lp_tokens_to_display, shares_to_display};
use parlay_core::{
    AllMarketsTransactions, Currency, CurrencyBalance, Market, Pool,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::activity::{user_transactions, UserActivity};
use crate::claims::{claimable_winnings, summarize_claims, ClaimEntry, ClaimSummary, ClaimableWinnings};
use crate::position::{lp_current_value, lp_initial_cost, position_usd_values, LpTokenBalance, PositionBalance};

/// One market paired with its pool snapshot and derived prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmMarket {
    pub market: Market,
    pub pool: Pool,
    pub currency: Currency,
    /// USD price of one unit of the pool's collateral
    pub cash_usd_price: Decimal,
    /// Per-outcome prices derived from the pool ratios
    pub outcome_prices: Vec<Decimal>,
}

impl AmmMarket {
    /// Pair a market with its pool, deriving outcome prices from the pool's
    /// ratios (weights as fallback).
    pub fn new(market: Market, pool: Pool, currency: Currency, cash_usd_price: Decimal) -> Self {
        let outcome_prices = parlay_amm::calculate_prices(&pool.ratios, &pool.weights);
        Self {
            market,
            pool,
            currency,
            cash_usd_price,
            outcome_prices,
        }
    }
}

/// Everything one refresh cycle captured for an account.
///
/// Built once per poll from the multicall/indexer results and passed down;
/// the engine treats it as an immutable value.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    /// The account being valued
    pub account: String,

    /// Markets with pools, keyed by market id
    pub markets: HashMap<String, AmmMarket>,

    /// Full transaction log, keyed by market id
    pub transactions: AllMarketsTransactions,

    /// Wallet balances per currency
    pub currency_balances: HashMap<Currency, CurrencyBalance>,

    /// Raw per-outcome share balances, keyed by market id
    pub share_balances_raw: HashMap<String, Vec<Decimal>>,

    /// Raw LP token balances, keyed by market id
    pub lp_balances_raw: HashMap<String, Decimal>,

    /// Per-outcome prices 24 hours ago, keyed by market id, where known
    pub past24hr_prices: HashMap<String, Vec<Decimal>>,
}

/// An account's share holdings in one market.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketShares {
    pub positions: Vec<PositionBalance>,
    /// Display share balance per outcome
    pub outcome_shares: Vec<Decimal>,
    /// Raw share balance per outcome
    pub outcome_shares_raw: Vec<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimable_winnings: Option<ClaimableWinnings>,
}

/// The full portfolio rollup handed back to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserBalances {
    pub currencies: HashMap<Currency, CurrencyBalance>,
    pub market_shares: HashMap<String, MarketShares>,
    pub lp_tokens: HashMap<String, LpTokenBalance>,
    pub claimable_winnings: HashMap<Currency, ClaimSummary>,

    pub total_position_usd: Decimal,
    pub total_24hr_position_usd: Decimal,
    pub change_24hr_position_usd: Decimal,
    pub available_funds_usd: Decimal,
    pub total_account_value: Decimal,
}

fn market_positions(
    amm: &AmmMarket,
    activity: &UserActivity,
    account: &str,
    shares_raw: &[Decimal],
    past24hr_prices: Option<&Vec<Decimal>>,
) -> MarketShares {
    let mut shares = MarketShares {
        outcome_shares_raw: shares_raw.to_vec(),
        outcome_shares: shares_raw.iter().map(|r| shares_to_display(*r)).collect(),
        ..Default::default()
    };

    for (outcome, raw) in shares_raw.iter().enumerate() {
        if raw.is_zero() {
            continue;
        }
        let balance = shares_to_display(*raw);
        let price = parlay_amm::value_at(&amm.outcome_prices, outcome);
        let outcome_name = amm
            .market
            .outcomes
            .get(outcome)
            .map(|o| o.name.as_str())
            .unwrap_or_default();
        let past24hr_price = past24hr_prices.map(|p| parlay_amm::value_at(p, outcome));
        if let Some(position) = position_usd_values(
            activity,
            account,
            *raw,
            balance,
            outcome,
            outcome_name,
            price,
            amm.cash_usd_price,
            past24hr_price,
        ) {
            shares.positions.push(position);
        }
    }

    shares
}

/// Roll an account snapshot up into portfolio-level balances.
///
/// Malformed markets are skipped with a warning rather than failing the
/// batch; markets missing from the snapshot's market lookup are silently
/// treated as not yet claimable.
pub fn compute_user_balances(snapshot: &AccountSnapshot) -> UserBalances {
    let mut balances = UserBalances {
        currencies: snapshot.currency_balances.clone(),
        ..Default::default()
    };

    let activities = user_transactions(&snapshot.transactions, &snapshot.account);
    let empty_activity = UserActivity::default();

    // positions per market
    for (market_id, shares_raw) in &snapshot.share_balances_raw {
        let key = market_id.to_lowercase();
        let Some(amm) = snapshot.markets.get(market_id) else {
            continue;
        };
        if let Err(e) = amm.pool.validate(amm.market.outcomes.len()) {
            warn!(%market_id, error = %e, "skipping malformed market");
            continue;
        }
        let activity = activities.get(&key).unwrap_or(&empty_activity);
        let market_shares = market_positions(
            amm,
            activity,
            &snapshot.account,
            shares_raw,
            snapshot.past24hr_prices.get(market_id),
        );
        balances.market_shares.insert(market_id.clone(), market_shares);
    }

    // claimable winnings over finalized markets
    let mut claim_entries: Vec<ClaimEntry> = Vec::new();
    for (market_id, shares) in balances.market_shares.iter_mut() {
        let Some(amm) = snapshot.markets.get(market_id) else {
            continue;
        };
        if !amm.market.is_finalized() {
            continue;
        }
        if let Some(claim) =
            claimable_winnings(&amm.market, &shares.positions, &shares.outcome_shares_raw)
        {
            claim_entries.push(ClaimEntry {
                currency: amm.currency,
                market_id: market_id.clone(),
                factory_address: amm.market.market_factory_address.clone(),
                claimable_balance: claim.claimable_balance,
            });
            shares.claimable_winnings = Some(claim);
        }
    }
    balances.claimable_winnings = summarize_claims(&claim_entries);

    // LP token valuations
    for (market_id, lp_raw) in &snapshot.lp_balances_raw {
        if lp_raw.is_zero() {
            continue;
        }
        let key = market_id.to_lowercase();
        let Some(amm) = snapshot.markets.get(market_id) else {
            continue;
        };
        let activity = activities.get(&key).unwrap_or(&empty_activity);
        let balance = lp_tokens_to_display(*lp_raw);
        let usd_value = parlay_amm::estimate_exit_shares(&amm.pool, balance)
            .ok()
            .and_then(|exit| lp_current_value(&exit, &amm.outcome_prices, amm.cash_usd_price));
        balances.lp_tokens.insert(
            market_id.clone(),
            LpTokenBalance {
                balance,
                raw_balance: *lp_raw,
                init_cost_usd: lp_initial_cost(activity),
                usd_value,
            },
        );
    }

    // totals
    let mut total = Decimal::ZERO;
    let mut total24 = Decimal::ZERO;
    for shares in balances.market_shares.values() {
        for position in &shares.positions {
            total += position.usd_value;
            if let Some(past) = position.past24hr_usd_value {
                total24 += past;
            }
        }
    }
    balances.total_position_usd = total;
    balances.total_24hr_position_usd = total24;
    balances.change_24hr_position_usd = total - total24;

    balances.available_funds_usd = balances
        .currencies
        .values()
        .map(|c| c.usd_value)
        .sum();
    balances.total_account_value = balances.available_funds_usd + balances.total_position_usd;

    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use parlay_core::units::bone;
    use parlay_core::{MarketOutcome, MarketTransactions, ReportingState, TradeEvent};
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn market(id: &str, state: ReportingState, winner: Option<usize>) -> Market {
        Market {
            market_id: id.into(),
            market_factory_address: "0xfactory".into(),
            market_index: 1,
            outcomes: vec![
                MarketOutcome {
                    id: 0,
                    name: "Away".into(),
                    share_token: "0xs0".into(),
                },
                MarketOutcome {
                    id: 1,
                    name: "Home".into(),
                    share_token: "0xs1".into(),
                },
            ],
            end_time: ts(0),
            reporting_state: state,
            winner,
            settlement_fee_raw: Decimal::ZERO,
        }
    }

    fn pool() -> Pool {
        Pool {
            address: Some("0xpool".into()),
            ratios: vec![dec!(50), dec!(50)],
            balances_raw: vec![dec!(1000) * bone(), dec!(1000) * bone()],
            weights: vec![dec!(25) * bone(), dec!(25) * bone()],
            fee_raw: dec!(15000000000000000),
            total_supply: dec!(100) * bone(),
            share_factor: dec!(1000000000000),
        }
    }

    fn snapshot() -> AccountSnapshot {
        let mut markets = HashMap::new();
        markets.insert(
            "0xfactory-1".to_string(),
            AmmMarket::new(
                market("0xfactory-1", ReportingState::Trading, None),
                pool(),
                Currency::Usdc,
                Decimal::ONE,
            ),
        );

        let mut transactions = AllMarketsTransactions::new();
        transactions.insert(
            "0xfactory-1".to_string(),
            MarketTransactions {
                trades: vec![TradeEvent {
                    user: "0xabc".into(),
                    outcome: 1,
                    shares: dec!(10),
                    collateral: dec!(-4),
                    price: dec!(0.4),
                    timestamp: ts(1),
                }],
                ..Default::default()
            },
        );

        let mut share_balances_raw = HashMap::new();
        share_balances_raw.insert(
            "0xfactory-1".to_string(),
            vec![Decimal::ZERO, dec!(10) * bone()],
        );

        let mut currency_balances = HashMap::new();
        currency_balances.insert(
            Currency::Usdc,
            CurrencyBalance {
                balance: dec!(250),
                raw_balance: dec!(250000000),
                usd_value: dec!(250),
            },
        );

        AccountSnapshot {
            account: "0xAbC".into(),
            markets,
            transactions,
            currency_balances,
            share_balances_raw,
            lp_balances_raw: HashMap::new(),
            past24hr_prices: HashMap::new(),
        }
    }

    #[test]
    fn test_rollup_totals() {
        let balances = compute_user_balances(&snapshot());

        // 10 shares at price 0.5 = 5 USD of positions
        assert_eq!(balances.total_position_usd, dec!(5));
        assert_eq!(balances.available_funds_usd, dec!(250));
        assert_eq!(balances.total_account_value, dec!(255));

        let shares = &balances.market_shares["0xfactory-1"];
        assert_eq!(shares.positions.len(), 1);
        let position = &shares.positions[0];
        assert_eq!(position.outcome_id, 1);
        assert_eq!(position.avg_price, dec!(0.4));
        assert_eq!(position.usd_value, dec!(5));
    }

    #[test]
    fn test_finalized_market_populates_claimables() {
        let mut snap = snapshot();
        let amm = snap.markets.get_mut("0xfactory-1").unwrap();
        amm.market.reporting_state = ReportingState::Finalized;
        amm.market.winner = Some(1);

        let balances = compute_user_balances(&snap);
        let shares = &balances.market_shares["0xfactory-1"];
        let claim = shares.claimable_winnings.as_ref().unwrap();
        // value 5 vs cost 4, 4 decimal places
        assert_eq!(claim.claimable_balance, dec!(1.0000));

        let summary = &balances.claimable_winnings[&Currency::Usdc];
        assert!(summary.has_winnings);
        assert_eq!(summary.total, dec!(1.0000));
        assert_eq!(summary.market_ids, vec!["0xfactory-1".to_string()]);
        assert_eq!(summary.factories, vec!["0xfactory".to_string()]);
    }

    #[test]
    fn test_market_missing_from_lookup_is_skipped() {
        let mut snap = snapshot();
        snap.share_balances_raw
            .insert("0xfactory-9".to_string(), vec![dec!(1) * bone()]);

        // unknown market: no position, no claim, no error
        let balances = compute_user_balances(&snap);
        assert!(!balances.market_shares.contains_key("0xfactory-9"));
        assert_eq!(balances.total_position_usd, dec!(5));
    }

    #[test]
    fn test_malformed_pool_is_skipped() {
        let mut snap = snapshot();
        let amm = snap.markets.get_mut("0xfactory-1").unwrap();
        amm.pool.balances_raw.pop();

        let balances = compute_user_balances(&snap);
        assert!(balances.market_shares.is_empty());
        // wallet funds still roll up
        assert_eq!(balances.total_account_value, dec!(250));
    }

    #[test]
    fn test_lp_tokens_valued_via_exit_estimate() {
        let mut snap = snapshot();
        snap.lp_balances_raw
            .insert("0xfactory-1".to_string(), dec!(10) * bone());

        let balances = compute_user_balances(&snap);
        let lp = &balances.lp_tokens["0xfactory-1"];
        assert_eq!(lp.balance, dec!(10));
        // 10% of a 1000/1000 pool at prices 0.5/0.5 = 100 USD
        assert_eq!(lp.usd_value, Some(dec!(100)));
    }

    #[test]
    fn test_24hr_change() {
        let mut snap = snapshot();
        snap.past24hr_prices
            .insert("0xfactory-1".to_string(), vec![dec!(0.6), dec!(0.4)]);

        let balances = compute_user_balances(&snap);
        // now: 10 * 0.5 = 5; then: 10 * 0.4 = 4
        assert_eq!(balances.total_24hr_position_usd, dec!(4));
        assert_eq!(balances.change_24hr_position_usd, dec!(1));
    }
}
