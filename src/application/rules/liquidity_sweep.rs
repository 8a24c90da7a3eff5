//! Liquidity sweep (stop run).
//!
//! Activation: the last candle wicks through the prior lookback extreme
//! but closes back inside — a sweep of resting stops below the low
//! (long) or above the high (short). The sweep extreme is the structural
//! stop: the thesis is invalid if price trades back through it.
//!
//! Confidence: `0.50 + 0.40 × reclaim` where `reclaim` is how far back
//! inside the candle closed, as a fraction of its full range. A close at
//! the top of a long sweep candle scores near 0.90 before alignment.

use super::{highest_high, lowest_low, split_window};
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::ports::pattern_rule::{PatternRule, RuleFire};
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

pub struct LiquiditySweepRule;

impl PatternRule for LiquiditySweepRule {
    fn pattern(&self) -> PatternId {
        PatternId::LiquiditySweep
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, _regime: &MarketRegime) -> Option<RuleFire> {
        let (prior, last) = split_window(&snapshot.candles)?;
        let range = last.h - last.l;
        if range <= 0.0 {
            return None;
        }

        let prior_low = lowest_low(prior);
        let prior_high = highest_high(prior);

        // Sell-side sweep: wick below the prior low, close reclaimed above it.
        if last.l < prior_low && last.c > prior_low {
            let reclaim = ((last.c - last.l) / range).clamp(0.0, 1.0);
            return Some(RuleFire {
                direction: TradeDirection::Long,
                entry: last.c,
                structural_stop: last.l,
                base_confidence: 0.50 + 0.40 * reclaim,
                thesis: format!(
                    "Swept the {}-bar low {:.6} to {:.6} and reclaimed, closing {:.6}",
                    prior.len(),
                    prior_low,
                    last.l,
                    last.c
                ),
            });
        }

        // Buy-side sweep: wick above the prior high, close rejected below it.
        if last.h > prior_high && last.c < prior_high {
            let reclaim = ((last.h - last.c) / range).clamp(0.0, 1.0);
            return Some(RuleFire {
                direction: TradeDirection::Short,
                entry: last.c,
                structural_stop: last.h,
                base_confidence: 0.50 + 0.40 * reclaim,
                thesis: format!(
                    "Swept the {}-bar high {:.6} to {:.6} and rejected, closing {:.6}",
                    prior.len(),
                    prior_high,
                    last.h,
                    last.c
                ),
            });
        }

        None
    }
}
