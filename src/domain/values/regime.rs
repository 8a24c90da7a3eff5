use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liquidity {
    Thin,
    Normal,
    Deep,
}

/// Classified market context at a point in time. Derived from a candle
/// window, never persisted on its own — always recomputed or attached to
/// a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub trend: Trend,
    pub volatility: Volatility,
    pub liquidity: Liquidity,
    pub as_of: DateTime<Utc>,
}

impl MarketRegime {
    /// The degraded default reported when the window is too short to
    /// classify. Not an error.
    pub fn neutral(as_of: DateTime<Utc>) -> Self {
        Self {
            trend: Trend::Side,
            volatility: Volatility::Mid,
            liquidity: Liquidity::Normal,
            as_of,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.trend == Trend::Side
            && self.volatility == Volatility::Mid
            && self.liquidity == Liquidity::Normal
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}/{:?}",
            self.trend, self.volatility, self.liquidity
        )
    }
}
