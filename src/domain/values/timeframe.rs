use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle aggregation interval for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    M5,
    M15,
    H1,
    H4,
    D1,
}

impl Timeframe {
    pub fn minutes(&self) -> u32 {
        match self {
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::M5 => write!(f, "5m"),
            Timeframe::M15 => write!(f, "15m"),
            Timeframe::H1 => write!(f, "1h"),
            Timeframe::H4 => write!(f, "4h"),
            Timeframe::D1 => write!(f, "1d"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" | "m5" => Ok(Timeframe::M5),
            "15m" | "m15" => Ok(Timeframe::M15),
            "1h" | "h1" => Ok(Timeframe::H1),
            "4h" | "h4" => Ok(Timeframe::H4),
            "1d" | "d1" => Ok(Timeframe::D1),
            _ => Err(format!("Unknown timeframe: {s} (expected 5m/15m/1h/4h/1d)")),
        }
    }
}
