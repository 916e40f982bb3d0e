//! Market definitions for categorical prediction markets

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The zero address; a market with this winner has not resolved.
pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Resolution state of a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingState {
    /// Market is open for trading
    Trading,
    /// Trading has ended, result is being reported
    Reporting,
    /// Reported result is under dispute
    Disputing,
    /// Result is final; winnings are claimable
    Finalized,
    /// Winnings have been paid out
    Settled,
}

impl Default for ReportingState {
    fn default() -> Self {
        ReportingState::Trading
    }
}

impl ReportingState {
    /// Whether the market has a final result
    pub fn is_resolved(&self) -> bool {
        matches!(self, ReportingState::Finalized | ReportingState::Settled)
    }
}

/// One possible resolution of a market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOutcome {
    /// Outcome index within the market
    pub id: usize,

    /// Human-readable outcome name (e.g. "Home team wins")
    pub name: String,

    /// ERC20 share token backing this outcome
    pub share_token: String,
}

/// A single categorical event definition
///
/// Created by a market-factory call; mutated only by resolution (the winner
/// is set once, then immutable); never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Composite identifier: `{factory_address}-{market_index}`
    pub market_id: String,

    /// Factory contract this market was created by
    pub market_factory_address: String,

    /// Index of the market within its factory
    pub market_index: u32,

    /// Outcome set, in share-token order
    pub outcomes: Vec<MarketOutcome>,

    /// When the market closes for trading
    pub end_time: DateTime<Utc>,

    /// Current resolution state
    pub reporting_state: ReportingState,

    /// Winning outcome index; `None` until finalized
    pub winner: Option<usize>,

    /// Settlement fee, 18-decimal fixed-point fraction
    pub settlement_fee_raw: Decimal,
}

impl Market {
    /// Composite market id used to key transaction logs and pools
    pub fn market_id(factory_address: &str, market_index: u32) -> String {
        format!("{}-{}", factory_address.to_lowercase(), market_index)
    }

    /// Decode a winner address against the outcome share tokens.
    ///
    /// The chain reports the winner as a share-token address; the null
    /// address (or a token that is not part of this market) means no winner
    /// yet. Returns the winner index and the implied reporting state.
    pub fn decode_winner(
        share_tokens: &[String],
        winner_address: &str,
    ) -> (Option<usize>, ReportingState) {
        if winner_address == NULL_ADDRESS {
            return (None, ReportingState::Trading);
        }
        match share_tokens
            .iter()
            .position(|t| crate::transactions::same_address(t, winner_address))
        {
            Some(idx) => (Some(idx), ReportingState::Finalized),
            None => (None, ReportingState::Trading),
        }
    }

    /// Whether this market's winnings are claimable
    pub fn is_finalized(&self) -> bool {
        self.reporting_state == ReportingState::Finalized && self.winner.is_some()
    }

    /// The winning outcome, if the market has resolved
    pub fn winning_outcome(&self) -> Option<&MarketOutcome> {
        self.winner.and_then(|idx| self.outcomes.get(idx))
    }

    /// Settlement fee as a percentage for display
    pub fn settlement_fee_percent(&self) -> Decimal {
        self.settlement_fee_raw / crate::units::bone() * Decimal::from(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_winner_null_address() {
        let tokens = vec!["0xaaa".to_string(), "0xbbb".to_string()];
        let (winner, state) = Market::decode_winner(&tokens, NULL_ADDRESS);
        assert_eq!(winner, None);
        assert_eq!(state, ReportingState::Trading);
    }

    #[test]
    fn test_decode_winner_matches_case_insensitively() {
        let tokens = vec!["0xAAA".to_string(), "0xBBB".to_string()];
        let (winner, state) = Market::decode_winner(&tokens, "0xbbb");
        assert_eq!(winner, Some(1));
        assert_eq!(state, ReportingState::Finalized);
    }

    #[test]
    fn test_decode_winner_unknown_token() {
        let tokens = vec!["0xaaa".to_string()];
        let (winner, state) = Market::decode_winner(&tokens, "0xccc");
        assert_eq!(winner, None);
        assert_eq!(state, ReportingState::Trading);
    }
}
