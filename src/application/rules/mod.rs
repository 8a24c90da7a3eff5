//! Pattern rule catalog.
//!
//! One file per pattern, each implementing [`PatternRule`]. Every rule's
//! module docs state its activation condition and confidence formula —
//! that documentation is the pattern catalog. Tie-breaks between rules
//! use the priority table on [`PatternId`].
//!
//! | pattern         | activation (long side)                               | base confidence                      |
//! |-----------------|------------------------------------------------------|--------------------------------------|
//! | breakout        | close above prior 20-bar high                        | 0.55 + 0.15 × min(margin/ATR, 1)     |
//! | liquidity-sweep | wick below prior 20-bar low, close back above        | 0.50 + 0.40 × reclaim fraction       |
//! | order-block     | retest of last bearish candle before impulsive rally | 0.50 + 0.20 × min(disp/3×body, 1)    |
//! | fair-value-gap  | retrace into a three-candle gap                      | 0.50 + 0.25 × min(gap/ATR, 1)        |
//! | ma-cross        | SMA(5) crossing SMA(20)                              | 0.45 + min(20 × separation, 0.20)    |
//!
//! Shorts mirror the conditions. The detector then applies the shared
//! regime alignment below and clamps into [0,1].

pub mod breakout;
pub mod fair_value_gap;
pub mod liquidity_sweep;
pub mod ma_cross;
pub mod order_block;

use crate::domain::entities::snapshot::Candle;
use crate::domain::ports::pattern_rule::PatternRule;
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::regime::{Liquidity, MarketRegime, Trend, Volatility};

/// Bars of history each rule looks back over, excluding the candle being
/// evaluated. Rules return `None` below `RULE_LOOKBACK + 1` candles.
pub const RULE_LOOKBACK: usize = 20;

/// Regime alignment adjustments, applied identically to every rule:
/// trend agreement +0.10, disagreement −0.15, low volatility −0.10,
/// thin liquidity −0.05. The result is unclamped — signal construction
/// clamps.
pub fn align_confidence(base: f64, direction: TradeDirection, regime: &MarketRegime) -> f64 {
    let mut c = base;
    match (regime.trend, direction) {
        (Trend::Up, TradeDirection::Long) | (Trend::Down, TradeDirection::Short) => c += 0.10,
        (Trend::Up, TradeDirection::Short) | (Trend::Down, TradeDirection::Long) => c -= 0.15,
        (Trend::Side, _) => {}
    }
    if regime.volatility == Volatility::Low {
        c -= 0.10;
    }
    if regime.liquidity == Liquidity::Thin {
        c -= 0.05;
    }
    c
}

/// The full catalog in priority order.
pub fn default_rules() -> Vec<Box<dyn PatternRule>> {
    vec![
        Box::new(breakout::BreakoutRule),
        Box::new(liquidity_sweep::LiquiditySweepRule),
        Box::new(order_block::OrderBlockRule),
        Box::new(fair_value_gap::FairValueGapRule),
        Box::new(ma_cross::MaCrossRule),
    ]
}

/// Split a series into (lookback window, last candle). `None` when there
/// is not enough history.
pub(crate) fn split_window(candles: &[Candle]) -> Option<(&[Candle], &Candle)> {
    if candles.len() < RULE_LOOKBACK + 1 {
        return None;
    }
    let last = &candles[candles.len() - 1];
    let prior = &candles[candles.len() - 1 - RULE_LOOKBACK..candles.len() - 1];
    Some((prior, last))
}

pub(crate) fn highest_high(candles: &[Candle]) -> f64 {
    candles.iter().map(|c| c.h).fold(f64::MIN, f64::max)
}

pub(crate) fn lowest_low(candles: &[Candle]) -> f64 {
    candles.iter().map(|c| c.l).fold(f64::MAX, f64::min)
}

pub(crate) fn mean_true_range(candles: &[Candle]) -> f64 {
    if candles.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 1..candles.len() {
        sum += candles[i].true_range(candles[i - 1].c);
    }
    sum / (candles.len() - 1) as f64
}

pub(crate) fn mean_body(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    candles.iter().map(|c| c.body()).sum::<f64>() / candles.len() as f64
}

pub(crate) fn sma(closes: &[f64]) -> f64 {
    closes.iter().sum::<f64>() / closes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn regime(trend: Trend, volatility: Volatility, liquidity: Liquidity) -> MarketRegime {
        MarketRegime {
            trend,
            volatility,
            liquidity,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn test_trend_agreement_boosts() {
        let r = regime(Trend::Up, Volatility::Mid, Liquidity::Normal);
        assert!((align_confidence(0.6, TradeDirection::Long, &r) - 0.7).abs() < 1e-9);
        assert!((align_confidence(0.6, TradeDirection::Short, &r) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_low_vol_and_thin_liquidity_penalize() {
        let r = regime(Trend::Side, Volatility::Low, Liquidity::Thin);
        assert!((align_confidence(0.6, TradeDirection::Long, &r) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_catalog_matches_priority_order() {
        let rules = default_rules();
        let priorities: Vec<u8> = rules.iter().map(|r| r.pattern().priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
    }
}
