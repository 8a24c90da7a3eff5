//! Plan building and lifecycle transitions.
//!
//! Builds a `proposed` plan from a signal plus its risk assessment, with
//! expectancy seeded from the pattern's lesson when enough evidence
//! exists. Every transition is recorded as an action node; the entity's
//! state machine rejects anything but forward moves before persistence
//! is touched.

use crate::application::graph::ActionGraphUseCase;
use crate::application::risk::RiskAssessment;
use crate::domain::entities::action_node::NodeKind;
use crate::domain::entities::lesson::Lesson;
use crate::domain::entities::outcome::TradeOutcome;
use crate::domain::entities::signal::Signal;
use crate::domain::entities::trade_plan::{PlanStatus, TradePlan};
use crate::domain::error::DomainError;
use crate::domain::ports::lesson_repository::{LessonRepository, OutcomeRepository};
use crate::domain::ports::plan_repository::{PlanFilter, PlanRepository};
use crate::domain::values::close_reason::ClosedReason;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Expectancy prior when a pattern has no (or too little) history:
/// coin-flip odds with targets at 1R/2R averaging 1.5R against a 1R stop.
const NEUTRAL_WIN_RATE: f64 = 0.5;
const NEUTRAL_AVG_WIN_R: f64 = 1.5;
const NEUTRAL_AVG_LOSS_R: f64 = 1.0;

/// Outcomes a lesson needs before it overrides the neutral prior.
const LESSON_PRIOR_MIN_SAMPLE: usize = 5;

pub struct PlanUseCase {
    plans: Arc<dyn PlanRepository>,
    outcomes: Arc<dyn OutcomeRepository>,
    lessons: Arc<dyn LessonRepository>,
    graph: Arc<ActionGraphUseCase>,
}

impl PlanUseCase {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        outcomes: Arc<dyn OutcomeRepository>,
        lessons: Arc<dyn LessonRepository>,
        graph: Arc<ActionGraphUseCase>,
    ) -> Self {
        Self {
            plans,
            outcomes,
            lessons,
            graph,
        }
    }

    /// Build and persist a `proposed` plan under a pre-allocated id (the
    /// id also keys the action chain, which may already hold the detect
    /// and risk-check nodes).
    pub fn build(
        &self,
        plan_id: String,
        signal: &Signal,
        assessment: &RiskAssessment,
    ) -> Result<TradePlan, DomainError> {
        let prior = self.lessons.for_pattern(signal.pattern)?;
        let plan = TradePlan {
            id: plan_id,
            signal_id: signal.id.clone(),
            pattern: signal.pattern,
            address: signal.address.clone(),
            timeframe: signal.timeframe,
            direction: signal.direction,
            entry: signal.entry_price,
            stop_loss: signal.structural_stop,
            take_profits: assessment.take_profits.clone(),
            size_usd: assessment.size_usd,
            risk_percent: assessment.risk_percent,
            expectancy_r: expectancy_r(prior.as_ref()),
            status: PlanStatus::Proposed,
            created_at: Utc::now(),
            activated_at: None,
            closed_at: None,
        };
        self.plans.save(&plan)?;
        Ok(plan)
    }

    pub fn activate(&self, id: &str) -> Result<TradePlan, DomainError> {
        let mut plan = self.require(id)?;
        let now = Utc::now();
        plan.activate(now)?;
        self.plans.update(&plan)?;
        self.graph.record_next(
            id,
            NodeKind::Execute,
            json!({ "status": plan.status, "entry": plan.entry, "size_usd": plan.size_usd }),
        )?;
        Ok(plan)
    }

    /// Close an active plan, emit its outcome, and record the terminal
    /// node. The outcome is produced exactly once — a second close
    /// attempt fails in the state machine before anything is written.
    pub fn close(
        &self,
        id: &str,
        exit_price: f64,
        reason: ClosedReason,
    ) -> Result<(TradePlan, TradeOutcome), DomainError> {
        let mut plan = self.require(id)?;
        let now = Utc::now();
        plan.close(now)?;
        self.plans.update(&plan)?;

        let outcome = TradeOutcome::from_close(&plan, exit_price, reason, now);
        self.outcomes.save(&outcome)?;
        self.graph.record_next(
            id,
            NodeKind::Close,
            json!({
                "exit_price": exit_price,
                "reason": reason,
                "realized_r": outcome.realized_r,
                "realized_pnl_usd": outcome.realized_pnl_usd,
            }),
        )?;
        Ok((plan, outcome))
    }

    /// Cancel a proposed plan. No outcome is emitted.
    pub fn cancel(&self, id: &str) -> Result<TradePlan, DomainError> {
        let mut plan = self.require(id)?;
        plan.cancel(Utc::now())?;
        self.plans.update(&plan)?;
        self.graph
            .record_next(id, NodeKind::Cancel, json!({ "status": plan.status }))?;
        Ok(plan)
    }

    pub fn get(&self, id: &str) -> Result<Option<TradePlan>, DomainError> {
        self.plans.get(id)
    }

    pub fn list(&self, filter: &PlanFilter) -> Result<Vec<TradePlan>, DomainError> {
        self.plans.list(filter)
    }

    fn require(&self, id: &str) -> Result<TradePlan, DomainError> {
        self.plans
            .get(id)?
            .ok_or_else(|| DomainError::NotFound(format!("Trade plan not found: {id}")))
    }
}

/// `win_rate × avg_win − loss_rate × avg_loss`, in R-multiples. The
/// pattern's lesson supplies the terms once it has enough samples.
pub fn expectancy_r(lesson: Option<&Lesson>) -> f64 {
    let (win_rate, avg_win, avg_loss) = match lesson {
        Some(l) if l.sample_size >= LESSON_PRIOR_MIN_SAMPLE => {
            (l.win_rate, l.avg_win_r, l.avg_loss_r)
        }
        _ => (NEUTRAL_WIN_RATE, NEUTRAL_AVG_WIN_R, NEUTRAL_AVG_LOSS_R),
    };
    win_rate * avg_win - (1.0 - win_rate) * avg_loss
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::pattern::PatternId;

    fn lesson(sample_size: usize, win_rate: f64, avg_win_r: f64, avg_loss_r: f64) -> Lesson {
        Lesson {
            id: Lesson::id_for(PatternId::Breakout),
            pattern: PatternId::Breakout,
            score: 0.5,
            win_rate,
            avg_r: 0.0,
            avg_win_r,
            avg_loss_r,
            sample_size,
            summary: String::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_neutral_default_expectancy() {
        // 0.5 × 1.5 − 0.5 × 1.0
        assert!((expectancy_r(None) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_small_sample_falls_back_to_neutral() {
        let l = lesson(2, 1.0, 3.0, 0.0);
        assert!((expectancy_r(Some(&l)) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_seasoned_lesson_overrides() {
        let l = lesson(20, 0.6, 2.0, 1.0);
        // 0.6 × 2.0 − 0.4 × 1.0
        assert!((expectancy_r(Some(&l)) - 0.8).abs() < 1e-9);
    }
}
