//! One evaluation cycle: candles → regime → signal → risk → plan, with
//! the decision trail recorded as action nodes along the way.
//!
//! Absence of a signal is a valid, non-error result. Commentary failure
//! degrades to a templated thesis and never blocks plan creation. Only
//! exhausted transient failures, not-found assets, persistence conflicts
//! and cancellation surface as errors.

use crate::application::detect::SignalDetector;
use crate::application::graph::ActionGraphUseCase;
use crate::application::plan::PlanUseCase;
use crate::application::regime::classify;
use crate::application::risk::{size_position, DEFAULT_RISK_PERCENT};
use crate::domain::entities::action_node::{ActionNode, NodeKind};
use crate::domain::entities::lesson::Lesson;
use crate::domain::entities::signal::Signal;
use crate::domain::entities::snapshot::MarketSnapshot;
use crate::domain::entities::trade_plan::TradePlan;
use crate::domain::error::DomainError;
use crate::domain::ports::candle_provider::CandleProvider;
use crate::domain::ports::commentary::CommentaryProvider;
use crate::domain::ports::lesson_repository::LessonRepository;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::values::regime::MarketRegime;
use crate::domain::values::timeframe::Timeframe;
use crate::infrastructure::retry::{with_backoff, RetryPolicy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Candles requested per evaluation. Rules need 21; the rest is regime
/// and indicator headroom.
const CANDLE_LIMIT: usize = 200;

const THESIS_PROMPT: &str = "Write a concise two-sentence trade thesis for the setup described \
     by the variables. Mention the pattern, direction, and regime context.";

#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub address: String,
    pub chain: String,
    pub timeframe: Timeframe,
    pub account_equity: f64,
    /// Defaults to [`DEFAULT_RISK_PERCENT`] when unset.
    pub risk_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub evaluated_at: DateTime<Utc>,
    pub address: String,
    pub chain: String,
    pub timeframe: Timeframe,
    pub candles_used: usize,
    pub regime: MarketRegime,
    pub signal: Option<Signal>,
    pub trade_plan: Option<TradePlan>,
    pub action_nodes: Vec<ActionNode>,
    pub lessons: Vec<Lesson>,
    /// Why a detected signal produced no plan (e.g. invalid risk inputs).
    pub skipped_reason: Option<String>,
}

pub struct EvaluateUseCase {
    candles: Arc<dyn CandleProvider>,
    commentary: Arc<dyn CommentaryProvider>,
    signals: Arc<dyn SignalRepository>,
    lessons: Arc<dyn LessonRepository>,
    detector: SignalDetector,
    plan_uc: Arc<PlanUseCase>,
    graph: Arc<ActionGraphUseCase>,
    retry: RetryPolicy,
}

impl EvaluateUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        candles: Arc<dyn CandleProvider>,
        commentary: Arc<dyn CommentaryProvider>,
        signals: Arc<dyn SignalRepository>,
        lessons: Arc<dyn LessonRepository>,
        detector: SignalDetector,
        plan_uc: Arc<PlanUseCase>,
        graph: Arc<ActionGraphUseCase>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            candles,
            commentary,
            signals,
            lessons,
            detector,
            plan_uc,
            graph,
            retry,
        }
    }

    pub async fn execute(
        &self,
        req: &EvaluationRequest,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport, DomainError> {
        let candles = with_backoff(&self.retry, cancel, || {
            self.candles
                .get_candles(&req.address, &req.chain, req.timeframe, CANDLE_LIMIT)
        })
        .await?;

        let snapshot = MarketSnapshot::new(
            req.address.clone(),
            req.chain.clone(),
            req.timeframe,
            candles,
            Utc::now(),
        );
        let regime = classify(&snapshot.candles, snapshot.as_of());
        let lessons = self.lessons.list()?;

        let Some(mut signal) = self.detector.detect(&snapshot, &regime) else {
            return Ok(EvaluationReport {
                evaluated_at: Utc::now(),
                address: req.address.clone(),
                chain: req.chain.clone(),
                timeframe: req.timeframe,
                candles_used: snapshot.len(),
                regime,
                signal: None,
                trade_plan: None,
                action_nodes: Vec::new(),
                lessons,
                skipped_reason: None,
            });
        };

        signal.thesis = self.thesis_for(&signal, cancel).await?;
        self.signals.save(&signal)?;

        // The plan id is allocated up front: it keys the action chain even
        // when the risk check aborts the lifecycle before a plan exists.
        let plan_id = uuid::Uuid::new_v4().to_string();
        self.graph.record_root(
            plan_id.clone(),
            json!({
                "signal_id": signal.id,
                "pattern": signal.pattern,
                "direction": signal.direction,
                "confidence": signal.confidence.value(),
                "regime": signal.regime,
            }),
        )?;

        let risk_percent = req.risk_percent.unwrap_or(DEFAULT_RISK_PERCENT);
        let (trade_plan, skipped_reason) =
            match size_position(&signal, req.account_equity, risk_percent) {
                Ok(assessment) => {
                    self.graph.record_next(
                        &plan_id,
                        NodeKind::RiskCheck,
                        json!({
                            "ok": true,
                            "stop_distance": assessment.stop_distance,
                            "size_usd": assessment.size_usd,
                            "risk_percent": assessment.risk_percent,
                        }),
                    )?;
                    let plan = self.plan_uc.build(plan_id.clone(), &signal, &assessment)?;
                    self.graph.record_next(
                        &plan_id,
                        NodeKind::Plan,
                        json!({
                            "entry": plan.entry,
                            "stop_loss": plan.stop_loss,
                            "take_profits": plan.take_profits,
                            "size_usd": plan.size_usd,
                            "expectancy_r": plan.expectancy_r,
                        }),
                    )?;
                    (Some(plan), None)
                }
                Err(e @ DomainError::InvalidPlanInputs(_)) => {
                    self.graph.record_next(
                        &plan_id,
                        NodeKind::RiskCheck,
                        json!({ "ok": false, "reason": e.to_string() }),
                    )?;
                    (None, Some(e.to_string()))
                }
                Err(e) => return Err(e),
            };

        Ok(EvaluationReport {
            evaluated_at: Utc::now(),
            address: req.address.clone(),
            chain: req.chain.clone(),
            timeframe: req.timeframe,
            candles_used: snapshot.len(),
            regime,
            action_nodes: self.graph.nodes_for(&plan_id)?,
            signal: Some(signal),
            trade_plan,
            lessons,
            skipped_reason,
        })
    }

    /// AI commentary with retry; degrades to the templated thesis on any
    /// failure except cancellation, which propagates.
    async fn thesis_for(
        &self,
        signal: &Signal,
        cancel: &CancellationToken,
    ) -> Result<String, DomainError> {
        let vars = json!({
            "pattern": signal.pattern,
            "direction": signal.direction,
            "address": signal.address,
            "timeframe": signal.timeframe,
            "entry": signal.entry_price,
            "stop": signal.structural_stop,
            "confidence": signal.confidence.value(),
            "regime": signal.regime,
            "mechanics": signal.thesis,
        });

        match with_backoff(&self.retry, cancel, || {
            self.commentary.assist(THESIS_PROMPT, &vars)
        })
        .await
        {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Err(DomainError::Cancelled) => Err(DomainError::Cancelled),
            Ok(_) => Ok(fallback_thesis(signal)),
            Err(e) => {
                warn!(
                    provider = self.commentary.name(),
                    error = %e,
                    "commentary unavailable, using templated thesis"
                );
                Ok(fallback_thesis(signal))
            }
        }
    }
}

/// Templated thesis used whenever commentary is unavailable.
pub fn fallback_thesis(signal: &Signal) -> String {
    format!(
        "{} {} on {} {}: {}. Regime {}.",
        signal.direction,
        signal.pattern,
        signal.address,
        signal.timeframe,
        signal.thesis,
        signal.regime
    )
}
