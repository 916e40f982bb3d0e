//! Collateral currency definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collateral currencies the pools settle in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// USDC - 6 decimal stablecoin collateral
    Usdc,
    /// ETH - 18 decimal native collateral
    Eth,
}

impl Currency {
    /// On-chain decimal places for this currency
    pub fn decimals(&self) -> u32 {
        match self {
            Currency::Usdc => 6,
            Currency::Eth => 18,
        }
    }

    /// Get the full display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Usdc => "USDC",
            Currency::Eth => "ETH",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USDC" => Ok(Currency::Usdc),
            "ETH" | "WETH" => Ok(Currency::Eth),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

/// A wallet balance in one currency
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyBalance {
    /// Display-unit balance
    pub balance: Decimal,

    /// On-chain integer balance
    pub raw_balance: Decimal,

    /// Balance marked to USD
    pub usd_value: Decimal,
}

impl CurrencyBalance {
    /// Build a balance from an on-chain amount and the currency's USD price
    pub fn from_onchain(raw_balance: Decimal, decimals: u32, usd_price: Decimal) -> Self {
        let balance = crate::units::cash_to_display(raw_balance, decimals);
        Self {
            balance,
            raw_balance,
            usd_value: balance * usd_price,
        }
    }
}
