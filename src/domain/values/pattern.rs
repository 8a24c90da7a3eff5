//! The closed pattern catalog.
//!
//! Every detectable setup is one of these variants. The catalog carries an
//! explicit priority table so that tie-breaking between simultaneously
//! firing rules is a documented total order, not an artifact of iteration
//! order:
//!
//! | pattern         | priority |
//! |-----------------|----------|
//! | breakout        | 1        |
//! | liquidity-sweep | 2        |
//! | order-block     | 3        |
//! | fair-value-gap  | 4        |
//! | ma-cross        | 5        |
//!
//! Lower number wins when two rules fire with exactly equal confidence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternId {
    Breakout,
    LiquiditySweep,
    OrderBlock,
    FairValueGap,
    MaCross,
}

impl PatternId {
    /// Tie-break priority: lower wins. Stable across releases — append new
    /// patterns at the end of the table rather than renumbering.
    pub fn priority(&self) -> u8 {
        match self {
            PatternId::Breakout => 1,
            PatternId::LiquiditySweep => 2,
            PatternId::OrderBlock => 3,
            PatternId::FairValueGap => 4,
            PatternId::MaCross => 5,
        }
    }

    pub fn all() -> &'static [PatternId] {
        &[
            PatternId::Breakout,
            PatternId::LiquiditySweep,
            PatternId::OrderBlock,
            PatternId::FairValueGap,
            PatternId::MaCross,
        ]
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternId::Breakout => write!(f, "breakout"),
            PatternId::LiquiditySweep => write!(f, "liquidity-sweep"),
            PatternId::OrderBlock => write!(f, "order-block"),
            PatternId::FairValueGap => write!(f, "fair-value-gap"),
            PatternId::MaCross => write!(f, "ma-cross"),
        }
    }
}

impl FromStr for PatternId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakout" => Ok(PatternId::Breakout),
            "liquidity-sweep" | "liquidity_sweep" => Ok(PatternId::LiquiditySweep),
            "order-block" | "order_block" => Ok(PatternId::OrderBlock),
            "fair-value-gap" | "fair_value_gap" => Ok(PatternId::FairValueGap),
            "ma-cross" | "ma_cross" => Ok(PatternId::MaCross),
            _ => Err(format!("Unknown pattern: {s}")),
        }
    }
}
