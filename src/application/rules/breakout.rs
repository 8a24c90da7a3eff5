//! Range breakout.
//!
//! Activation: the last close exceeds the highest high of the prior
//! [`RULE_LOOKBACK`](super::RULE_LOOKBACK) candles (long), or undercuts
//! the lowest low (short). The broken level is the structural stop — a
//! valid breakout should not trade back through it.
//!
//! Confidence: `0.55 + 0.15 × min(margin / ATR, 1)` where `margin` is
//! how far the close cleared the level and ATR is the mean true range of
//! the lookback. A close barely poking through scores near 0.55; a full
//! ATR of clearance saturates at 0.70.

use super::{highest_high, lowest_low, mean_true_range, split_window};
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::ports::pattern_rule::{PatternRule, RuleFire};
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

pub struct BreakoutRule;

impl PatternRule for BreakoutRule {
    fn pattern(&self) -> PatternId {
        PatternId::Breakout
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, _regime: &MarketRegime) -> Option<RuleFire> {
        let (prior, last) = split_window(&snapshot.candles)?;
        let atr = mean_true_range(prior);
        if atr <= 0.0 {
            return None;
        }

        let range_high = highest_high(prior);
        let range_low = lowest_low(prior);

        if last.c > range_high {
            let margin = last.c - range_high;
            return Some(RuleFire {
                direction: TradeDirection::Long,
                entry: last.c,
                structural_stop: range_high,
                base_confidence: 0.55 + 0.15 * (margin / atr).min(1.0),
                thesis: format!(
                    "Close {:.6} broke above the {}-bar range high {:.6}",
                    last.c,
                    prior.len(),
                    range_high
                ),
            });
        }

        if last.c < range_low {
            let margin = range_low - last.c;
            return Some(RuleFire {
                direction: TradeDirection::Short,
                entry: last.c,
                structural_stop: range_low,
                base_confidence: 0.55 + 0.15 * (margin / atr).min(1.0),
                thesis: format!(
                    "Close {:.6} broke below the {}-bar range low {:.6}",
                    last.c,
                    prior.len(),
                    range_low
                ),
            });
        }

        None
    }
}
