//! Pattern rule port.
//!
//! Each catalog pattern is an independent rule object behind this trait:
//! a pure predicate plus confidence function over one snapshot. Adding a
//! pattern means adding one rule implementation and one `PatternId`
//! variant — the detector loop never changes.

use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

/// A rule's raw activation: where to enter, the structural level behind
/// the setup, and the rule-intrinsic confidence *before* regime
/// alignment. `base_confidence` may exceed [0,1] from a misbehaving
/// formula — the detector clamps at signal construction.
#[derive(Debug, Clone)]
pub struct RuleFire {
    pub direction: TradeDirection,
    pub entry: f64,
    pub structural_stop: f64,
    pub base_confidence: f64,
    /// One-line mechanical description of the setup, used as the
    /// fallback thesis when commentary is unavailable.
    pub thesis: String,
}

/// A pure pattern detector. `evaluate` must be deterministic given the
/// same snapshot and regime: no clock reads, no randomness, no state.
pub trait PatternRule: Send + Sync {
    /// Which catalog entry this rule implements.
    fn pattern(&self) -> PatternId;

    /// `None` when the pattern is not present — never an error.
    fn evaluate(&self, snapshot: &MarketSnapshot, regime: &MarketRegime) -> Option<RuleFire>;
}
