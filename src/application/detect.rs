//! Signal detection over the rule catalog.
//!
//! Runs every registered rule against one snapshot + regime, applies the
//! shared regime alignment, and emits at most one signal. Selection is a
//! documented total order: highest aligned confidence wins; exact ties
//! fall to the lower catalog priority number. The loop never depends on
//! registration order for the outcome.

use crate::application::rules::{align_confidence, default_rules};
use crate::domain::entities::signal::Signal;
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::ports::pattern_rule::{PatternRule, RuleFire};
use crate::domain::values::confidence::Confidence;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::regime::MarketRegime;

pub struct SignalDetector {
    rules: Vec<Box<dyn PatternRule>>,
}

struct Candidate {
    pattern: PatternId,
    fire: RuleFire,
    aligned: f64,
}

impl SignalDetector {
    pub fn new(rules: Vec<Box<dyn PatternRule>>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// `Ok`-shaped by construction: rules are pure predicates, so "no
    /// signal" is `None`, never an error and never a zero-confidence
    /// signal.
    pub fn detect(&self, snapshot: &MarketSnapshot, regime: &MarketRegime) -> Option<Signal> {
        let mut best: Option<Candidate> = None;

        for rule in &self.rules {
            let Some(fire) = rule.evaluate(snapshot, regime) else {
                continue;
            };
            let candidate = Candidate {
                pattern: rule.pattern(),
                aligned: align_confidence(fire.base_confidence, fire.direction, regime),
                fire,
            };
            best = Some(match best.take() {
                None => candidate,
                Some(current) => {
                    if Self::beats(&candidate, &current) {
                        candidate
                    } else {
                        current
                    }
                }
            });
        }

        let chosen = best?;
        Some(Signal::new(
            chosen.pattern,
            snapshot.address.clone(),
            snapshot.chain.clone(),
            snapshot.timeframe,
            chosen.fire.direction,
            chosen.fire.entry,
            chosen.fire.structural_stop,
            Confidence::clamped(chosen.aligned),
            chosen.fire.thesis,
            *regime,
            snapshot.as_of(),
        ))
    }

    /// Higher aligned confidence wins; exact ties go to the lower
    /// priority number from the catalog table.
    fn beats(challenger: &Candidate, incumbent: &Candidate) -> bool {
        match challenger.aligned.partial_cmp(&incumbent.aligned) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Less) => false,
            _ => challenger.pattern.priority() < incumbent.pattern.priority(),
        }
    }
}
