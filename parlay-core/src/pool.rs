//! Weighted-pool state snapshots

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::units::bone;

/// Snapshot of one AMM liquidity pool for one market's outcome set.
///
/// Balances are refreshed every poll cycle; weights and fee are set at pool
/// creation. Invariant: `balances_raw`, `weights`, and the market's outcome
/// set all have the same length. Prices derived from this pool sum to one
/// (within rounding) when the ratios/weights are nonzero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    /// Pool contract address; `None` until the pool is created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// On-chain token ratios reported by the factory; may be empty, in
    /// which case prices fall back to the weights
    pub ratios: Vec<Decimal>,

    /// On-chain integer share balances per outcome
    pub balances_raw: Vec<Decimal>,

    /// Per-outcome denormalized weights, 18-decimal fixed point
    pub weights: Vec<Decimal>,

    /// Swap fee, 18-decimal fixed-point fraction of trade value
    pub fee_raw: Decimal,

    /// Outstanding LP token supply; zero iff the pool is uninitialized
    pub total_supply: Decimal,

    /// Collateral-to-shares scaling constant for this market's factory
    pub share_factor: Decimal,
}

impl Pool {
    /// Swap fee as a decimal fraction (e.g. 0.015 for 1.5%)
    pub fn fee_decimal(&self) -> Decimal {
        self.fee_raw / bone()
    }

    /// Swap fee as a percentage for display
    pub fn fee_percent(&self) -> Decimal {
        self.fee_decimal() * Decimal::from(100)
    }

    /// Whether the pool has any liquidity
    pub fn has_liquidity(&self) -> bool {
        !self.total_supply.is_zero()
    }

    /// Number of outcomes this pool covers
    pub fn outcome_count(&self) -> usize {
        self.balances_raw.len()
    }

    /// Check the balances/weights/outcomes length invariant.
    pub fn validate(&self, outcome_count: usize) -> EngineResult<()> {
        if self.balances_raw.len() != self.weights.len()
            || self.balances_raw.len() != outcome_count
        {
            return Err(EngineError::malformed(format!(
                "pool shape mismatch: {} balances, {} weights, {} outcomes",
                self.balances_raw.len(),
                self.weights.len(),
                outcome_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_conversions() {
        // 1.5% fee: 15 * 10^15
        let pool = Pool {
            fee_raw: dec!(15_000_000_000_000_000),
            ..Default::default()
        };
        assert_eq!(pool.fee_decimal(), dec!(0.015));
        assert_eq!(pool.fee_percent(), dec!(1.5));
    }

    #[test]
    fn test_validate_shape() {
        let pool = Pool {
            balances_raw: vec![dec!(1), dec!(2)],
            weights: vec![dec!(1), dec!(2)],
            ..Default::default()
        };
        assert!(pool.validate(2).is_ok());
        assert!(pool.validate(3).is_err());
    }

    #[test]
    fn test_uninitialized_pool_has_no_liquidity() {
        assert!(!Pool::default().has_liquidity());
    }
}
