//! Fair value gap retrace.
//!
//! Activation (long): a three-candle bullish imbalance inside the
//! lookback — candle `i-2`'s high below candle `i`'s low leaves a gap
//! price never traded — and the last candle retraces into that gap
//! while still closing at or above its bottom. The gap bottom is the
//! structural stop. Shorts mirror with a bearish gap (`i-2` low above
//! `i` high).
//!
//! Confidence: `0.50 + 0.25 × min(gap_size / ATR, 1)` — wider gaps
//! relative to recent range imply a stronger imbalance.

use super::{mean_true_range, split_window};
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::ports::pattern_rule::{PatternRule, RuleFire};
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

pub struct FairValueGapRule;

impl PatternRule for FairValueGapRule {
    fn pattern(&self) -> PatternId {
        PatternId::FairValueGap
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, _regime: &MarketRegime) -> Option<RuleFire> {
        let (prior, last) = split_window(&snapshot.candles)?;
        let atr = mean_true_range(prior);
        if atr <= 0.0 {
            return None;
        }

        // Most recent gap wins.
        for i in (2..prior.len()).rev() {
            let lower = &prior[i - 2];
            let upper = &prior[i];

            // Bullish gap: untraded space between lower.h and upper.l.
            if upper.l > lower.h {
                let (bottom, top) = (lower.h, upper.l);
                if last.l <= top && last.c >= bottom {
                    let gap = top - bottom;
                    return Some(RuleFire {
                        direction: TradeDirection::Long,
                        entry: last.c,
                        structural_stop: bottom,
                        base_confidence: 0.50 + 0.25 * (gap / atr).min(1.0),
                        thesis: format!(
                            "Retrace into the bullish fair value gap {:.6}-{:.6}",
                            bottom, top
                        ),
                    });
                }
            }

            // Bearish gap: untraded space between upper.h and lower.l.
            if upper.h < lower.l {
                let (bottom, top) = (upper.h, lower.l);
                if last.h >= bottom && last.c <= top {
                    let gap = top - bottom;
                    return Some(RuleFire {
                        direction: TradeDirection::Short,
                        entry: last.c,
                        structural_stop: top,
                        base_confidence: 0.50 + 0.25 * (gap / atr).min(1.0),
                        thesis: format!(
                            "Retrace into the bearish fair value gap {:.6}-{:.6}",
                            bottom, top
                        ),
                    });
                }
            }
        }

        None
    }
}
