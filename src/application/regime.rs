//! Regime classification.
//!
//! Pure function of a candle window: trend from net displacement,
//! volatility from ATR%, liquidity from recent volume vs the window
//! baseline. Thresholds were calibrated offline against 1h DEX pool
//! data; they are deliberately coarse buckets, not tuned parameters.
//!
//! Fewer than [`REGIME_WINDOW`] candles degrades to the neutral
//! `side/mid/normal` regime rather than failing.

use crate::domain::entities::snapshot::Candle;
use crate::domain::values::regime::{Liquidity, MarketRegime, Trend, Volatility};
use chrono::{DateTime, Utc};

/// Minimum candles for a classification.
pub const REGIME_WINDOW: usize = 20;

/// Net return beyond which the window counts as trending.
const TREND_BAND: f64 = 0.02;

/// ATR as a fraction of price: below → low, above [`VOL_HIGH`] → high.
const VOL_LOW: f64 = 0.015;
const VOL_HIGH: f64 = 0.04;

/// Recent-vs-baseline volume ratio bounds for thin/deep.
const LIQ_THIN: f64 = 0.5;
const LIQ_DEEP: f64 = 1.5;

/// Candles the "recent" volume average spans.
const LIQ_RECENT: usize = 5;

pub fn classify(candles: &[Candle], as_of: DateTime<Utc>) -> MarketRegime {
    if candles.len() < REGIME_WINDOW {
        return MarketRegime::neutral(as_of);
    }
    let window = &candles[candles.len() - REGIME_WINDOW..];

    MarketRegime {
        trend: classify_trend(window),
        volatility: classify_volatility(window),
        liquidity: classify_liquidity(window),
        as_of,
    }
}

fn classify_trend(window: &[Candle]) -> Trend {
    let first = window[0].c;
    let last = window[window.len() - 1].c;
    if first <= 0.0 {
        return Trend::Side;
    }
    let net_return = (last - first) / first;
    if net_return > TREND_BAND {
        Trend::Up
    } else if net_return < -TREND_BAND {
        Trend::Down
    } else {
        Trend::Side
    }
}

fn classify_volatility(window: &[Candle]) -> Volatility {
    let last_close = window[window.len() - 1].c;
    if last_close <= 0.0 {
        return Volatility::Mid;
    }
    let mut sum_tr = 0.0;
    for i in 1..window.len() {
        sum_tr += window[i].true_range(window[i - 1].c);
    }
    let atr = sum_tr / (window.len() - 1) as f64;
    let atr_pct = atr / last_close;

    if atr_pct < VOL_LOW {
        Volatility::Low
    } else if atr_pct < VOL_HIGH {
        Volatility::Mid
    } else {
        Volatility::High
    }
}

fn classify_liquidity(window: &[Candle]) -> Liquidity {
    let volumes: Vec<f64> = window.iter().filter_map(|c| c.v).collect();
    // Venues without volume data get no liquidity penalty.
    if volumes.len() < window.len() {
        return Liquidity::Normal;
    }
    let baseline = volumes.iter().sum::<f64>() / volumes.len() as f64;
    if baseline <= 0.0 {
        return Liquidity::Normal;
    }
    let recent = &volumes[volumes.len() - LIQ_RECENT..];
    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
    let ratio = recent_avg / baseline;

    if ratio < LIQ_THIN {
        Liquidity::Thin
    } else if ratio > LIQ_DEEP {
        Liquidity::Deep
    } else {
        Liquidity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn candle(t: DateTime<Utc>, o: f64, h: f64, l: f64, c: f64, v: Option<f64>) -> Candle {
        Candle { t, o, h, l, c, v }
    }

    /// Flat series at `price` with tiny range and constant volume.
    fn flat(n: usize, price: f64) -> Vec<Candle> {
        let start = Utc::now() - Duration::hours(n as i64);
        (0..n)
            .map(|i| {
                candle(
                    start + Duration::hours(i as i64),
                    price,
                    price * 1.001,
                    price * 0.999,
                    price,
                    Some(1000.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_short_window_is_neutral() {
        let as_of = Utc::now();
        for n in 0..REGIME_WINDOW {
            let regime = classify(&flat(n, 100.0), as_of);
            assert!(regime.is_neutral(), "window of {n} must be neutral");
            assert_eq!(regime.as_of, as_of);
        }
    }

    #[test]
    fn test_uptrend_detected() {
        let start = Utc::now() - Duration::hours(30);
        // +0.5% per bar compounds well past the 2% band over 20 bars.
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let p = 100.0 * 1.005_f64.powi(i);
                candle(
                    start + Duration::hours(i as i64),
                    p,
                    p * 1.002,
                    p * 0.998,
                    p,
                    Some(1000.0),
                )
            })
            .collect();
        assert_eq!(classify(&candles, Utc::now()).trend, Trend::Up);
    }

    #[test]
    fn test_flat_series_is_side_low_vol() {
        let regime = classify(&flat(25, 100.0), Utc::now());
        assert_eq!(regime.trend, Trend::Side);
        assert_eq!(regime.volatility, Volatility::Low);
        assert_eq!(regime.liquidity, Liquidity::Normal);
    }

    #[test]
    fn test_wide_ranges_are_high_vol() {
        let start = Utc::now() - Duration::hours(25);
        let candles: Vec<Candle> = (0..25)
            .map(|i| {
                candle(
                    start + Duration::hours(i as i64),
                    100.0,
                    106.0,
                    94.0,
                    100.0,
                    Some(1000.0),
                )
            })
            .collect();
        assert_eq!(classify(&candles, Utc::now()).volatility, Volatility::High);
    }

    #[test]
    fn test_drying_volume_is_thin() {
        let mut candles = flat(25, 100.0);
        let n = candles.len();
        for c in candles[n - LIQ_RECENT..].iter_mut() {
            c.v = Some(100.0);
        }
        assert_eq!(classify(&candles, Utc::now()).liquidity, Liquidity::Thin);
    }

    #[test]
    fn test_missing_volume_is_normal() {
        let mut candles = flat(25, 100.0);
        candles[3].v = None;
        assert_eq!(classify(&candles, Utc::now()).liquidity, Liquidity::Normal);
    }

    #[test]
    fn test_deterministic() {
        let candles = flat(40, 250.0);
        let as_of = Utc::now();
        assert_eq!(classify(&candles, as_of), classify(&candles, as_of));
    }
}
