use crate::domain::values::confidence::Confidence;
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;
use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A detected, confidence-scored pattern occurrence.
///
/// Carries the structural level the risk sizer needs (`structural_stop`,
/// e.g. the swept low for a long sweep entry) alongside the scoring
/// fields. Absence of a signal is represented by the detector returning
/// `None` — never by a zero-confidence `Signal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub pattern: PatternId,
    pub address: String,
    pub chain: String,
    pub timeframe: Timeframe,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub structural_stop: f64,
    pub confidence: Confidence,
    pub thesis: String,
    pub regime: MarketRegime,
    pub detected_at: DateTime<Utc>,
}

impl Signal {
    /// Deterministic id for one (address, timeframe, tick). Re-evaluating
    /// the same tick produces the same id, so persistence dedupes to at
    /// most one signal per tick.
    pub fn tick_id(address: &str, timeframe: Timeframe, tick: DateTime<Utc>) -> String {
        format!("sig-{}-{}-{}", address, timeframe, tick.timestamp())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pattern: PatternId,
        address: String,
        chain: String,
        timeframe: Timeframe,
        direction: TradeDirection,
        entry_price: f64,
        structural_stop: f64,
        confidence: Confidence,
        thesis: String,
        regime: MarketRegime,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::tick_id(&address, timeframe, detected_at),
            pattern,
            address,
            chain,
            timeframe,
            direction,
            entry_price,
            structural_stop,
            confidence,
            thesis,
            regime,
            detected_at,
        }
    }
}
