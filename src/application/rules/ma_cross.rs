//! Moving-average cross.
//!
//! Activation: SMA(5) crosses SMA(20) between the previous and the last
//! candle. The slow average is the structural stop — a genuine trend
//! change should hold that side of it. Lowest-priority rule in the
//! catalog: it confirms late and mostly serves as a fallback when no
//! structural setup is present.
//!
//! Confidence: `0.45 + min(20 × separation, 0.20)` where `separation`
//! is the fractional distance between the averages after the cross.

use super::{sma, RULE_LOOKBACK};
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::ports::pattern_rule::{PatternRule, RuleFire};
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

const FAST: usize = 5;
const SLOW: usize = RULE_LOOKBACK;

pub struct MaCrossRule;

impl PatternRule for MaCrossRule {
    fn pattern(&self) -> PatternId {
        PatternId::MaCross
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, _regime: &MarketRegime) -> Option<RuleFire> {
        let candles = &snapshot.candles;
        if candles.len() < SLOW + 1 {
            return None;
        }
        let closes: Vec<f64> = candles.iter().map(|c| c.c).collect();
        let n = closes.len();

        let fast_now = sma(&closes[n - FAST..]);
        let slow_now = sma(&closes[n - SLOW..]);
        let fast_prev = sma(&closes[n - 1 - FAST..n - 1]);
        let slow_prev = sma(&closes[n - 1 - SLOW..n - 1]);
        if slow_now <= 0.0 {
            return None;
        }

        let last = &candles[n - 1];
        let separation = (fast_now - slow_now).abs() / slow_now;
        let base_confidence = 0.45 + (20.0 * separation).min(0.20);

        // Golden cross; require the close on the right side of the slow
        // average so the stop distance is positive.
        if fast_prev <= slow_prev && fast_now > slow_now && last.c > slow_now {
            return Some(RuleFire {
                direction: TradeDirection::Long,
                entry: last.c,
                structural_stop: slow_now,
                base_confidence,
                thesis: format!(
                    "SMA({FAST}) crossed above SMA({SLOW}) at {:.6}",
                    slow_now
                ),
            });
        }

        // Death cross.
        if fast_prev >= slow_prev && fast_now < slow_now && last.c < slow_now {
            return Some(RuleFire {
                direction: TradeDirection::Short,
                entry: last.c,
                structural_stop: slow_now,
                base_confidence,
                thesis: format!(
                    "SMA({FAST}) crossed below SMA({SLOW}) at {:.6}",
                    slow_now
                ),
            });
        }

        None
    }
}
