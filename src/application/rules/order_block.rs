//! Order block retest.
//!
//! Activation (long): within the lookback there is a bearish candle — the
//! block — whose next two candles rally impulsively (combined close
//! displacement above the block's close exceeds twice the lookback's
//! mean candle body), and the last close has retraced back inside the
//! block's range. The block is read as resting demand; its low is the
//! structural stop. Shorts mirror with a bullish block and an impulsive
//! drop.
//!
//! Confidence: `0.50 + 0.20 × min(displacement / (3 × mean_body), 1)` —
//! the more violent the move away from the block, the more conviction
//! the retest carries.

use super::{mean_body, split_window};
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::ports::pattern_rule::{PatternRule, RuleFire};
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

pub struct OrderBlockRule;

impl PatternRule for OrderBlockRule {
    fn pattern(&self) -> PatternId {
        PatternId::OrderBlock
    }

    fn evaluate(&self, snapshot: &MarketSnapshot, _regime: &MarketRegime) -> Option<RuleFire> {
        let (prior, last) = split_window(&snapshot.candles)?;
        let body_baseline = mean_body(prior);
        if body_baseline <= 0.0 {
            return None;
        }

        // Most recent qualifying block wins; scan backwards, leaving room
        // for the two impulse candles after the block.
        for i in (0..prior.len().saturating_sub(2)).rev() {
            let block = &prior[i];
            let impulse_end = prior[i + 2].c;

            // Demand block: bearish candle, impulsive rally off it,
            // price now back inside the block.
            if !block.is_bullish() {
                let displacement = impulse_end - block.c;
                if displacement > 2.0 * body_baseline
                    && last.c >= block.l
                    && last.c <= block.h
                {
                    return Some(RuleFire {
                        direction: TradeDirection::Long,
                        entry: last.c,
                        structural_stop: block.l,
                        base_confidence: 0.50
                            + 0.20 * (displacement / (3.0 * body_baseline)).min(1.0),
                        thesis: format!(
                            "Retest of demand block {:.6}-{:.6} after an impulsive rally to {:.6}",
                            block.l, block.h, impulse_end
                        ),
                    });
                }
            }

            // Supply block: bullish candle, impulsive drop off it.
            if block.is_bullish() {
                let displacement = block.c - impulse_end;
                if displacement > 2.0 * body_baseline
                    && last.c >= block.l
                    && last.c <= block.h
                {
                    return Some(RuleFire {
                        direction: TradeDirection::Short,
                        entry: last.c,
                        structural_stop: block.h,
                        base_confidence: 0.50
                            + 0.20 * (displacement / (3.0 * body_baseline)).min(1.0),
                        thesis: format!(
                            "Retest of supply block {:.6}-{:.6} after an impulsive drop to {:.6}",
                            block.l, block.h, impulse_end
                        ),
                    });
                }
            }
        }

        None
    }
}
