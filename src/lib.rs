pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::detect::SignalDetector;
use crate::application::evaluate::{EvaluateUseCase, EvaluationReport, EvaluationRequest};
use crate::application::graph::{ActionGraphUseCase, ReplaySummary};
use crate::application::lessons::LessonsUseCase;
use crate::application::plan::PlanUseCase;
use crate::domain::entities::action_node::ActionNode;
use crate::domain::entities::lesson::Lesson;
use crate::domain::entities::outcome::TradeOutcome;
use crate::domain::entities::signal::Signal;
use crate::domain::entities::trade_plan::TradePlan;
use crate::domain::error::DomainError;
use crate::domain::ports::candle_provider::CandleProvider;
use crate::domain::ports::commentary::CommentaryProvider;
use crate::domain::ports::lesson_repository::{LessonRepository, OutcomeRepository};
use crate::domain::ports::node_repository::ActionNodeRepository;
use crate::domain::ports::plan_repository::{PlanFilter, PlanRepository};
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::values::close_reason::ClosedReason;
use crate::domain::values::pattern::PatternId;
use crate::infrastructure::ai::noop::NoopCommentary;
use crate::infrastructure::ai::openai::OpenAiCommentary;
use crate::infrastructure::feeds::geckoterminal::GeckoTerminalFeed;
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::sqlite::lesson_repo::SqliteLessonRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::node_repo::SqliteNodeRepo;
use crate::infrastructure::sqlite::outcome_repo::SqliteOutcomeRepo;
use crate::infrastructure::sqlite::plan_repo::SqlitePlanRepo;
use crate::infrastructure::sqlite::signal_repo::SqliteSignalRepo;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub struct TradeTrail {
    evaluate_uc: EvaluateUseCase,
    plan_uc: Arc<PlanUseCase>,
    graph_uc: Arc<ActionGraphUseCase>,
    lessons_uc: LessonsUseCase,
    signals: Arc<dyn SignalRepository>,
}

impl TradeTrail {
    /// Wire real providers from the environment: GeckoTerminal candles
    /// always; commentary per `TRADETRAIL_AI_PROVIDER` (`openai` with
    /// `TRADETRAIL_AI_API_KEY`/`TRADETRAIL_AI_MODEL`, anything else is
    /// the no-op provider and plans get templated theses).
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let candles: Arc<dyn CandleProvider> = Arc::new(GeckoTerminalFeed::new());

        let provider = std::env::var("TRADETRAIL_AI_PROVIDER").unwrap_or_else(|_| "none".into());
        let commentary: Arc<dyn CommentaryProvider> = match provider.as_str() {
            "openai" => {
                let api_key = std::env::var("TRADETRAIL_AI_API_KEY").unwrap_or_default();
                let model = std::env::var("TRADETRAIL_AI_MODEL").ok();
                Arc::new(OpenAiCommentary::new(api_key, model))
            }
            _ => Arc::new(NoopCommentary),
        };

        Self::with_providers(db_path, candles, commentary, RetryPolicy::default())
    }

    /// Dependency-injected constructor; tests pass `:memory:` and fakes.
    pub fn with_providers(
        db_path: &str,
        candles: Arc<dyn CandleProvider>,
        commentary: Arc<dyn CommentaryProvider>,
        retry: RetryPolicy,
    ) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let signals: Arc<dyn SignalRepository> = Arc::new(SqliteSignalRepo::new(conn.clone()));
        let plans: Arc<dyn PlanRepository> = Arc::new(SqlitePlanRepo::new(conn.clone()));
        let nodes: Arc<dyn ActionNodeRepository> = Arc::new(SqliteNodeRepo::new(conn.clone()));
        let outcomes: Arc<dyn OutcomeRepository> = Arc::new(SqliteOutcomeRepo::new(conn.clone()));
        let lessons: Arc<dyn LessonRepository> = Arc::new(SqliteLessonRepo::new(conn));

        let graph_uc = Arc::new(ActionGraphUseCase::new(nodes));
        let plan_uc = Arc::new(PlanUseCase::new(
            plans,
            outcomes.clone(),
            lessons.clone(),
            graph_uc.clone(),
        ));
        let lessons_uc = LessonsUseCase::new(outcomes, lessons.clone());
        let evaluate_uc = EvaluateUseCase::new(
            candles,
            commentary,
            signals.clone(),
            lessons,
            SignalDetector::with_default_rules(),
            plan_uc.clone(),
            graph_uc.clone(),
            retry,
        );

        Ok(Self {
            evaluate_uc,
            plan_uc,
            graph_uc,
            lessons_uc,
            signals,
        })
    }

    // ── Evaluation ───────────────────────────────────────────────────

    pub async fn evaluate(
        &self,
        req: &EvaluationRequest,
    ) -> Result<EvaluationReport, DomainError> {
        self.evaluate_with_cancel(req, &CancellationToken::new())
            .await
    }

    pub async fn evaluate_with_cancel(
        &self,
        req: &EvaluationRequest,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport, DomainError> {
        self.evaluate_uc.execute(req, cancel).await
    }

    // ── Plan lifecycle ───────────────────────────────────────────────

    pub fn activate_plan(&self, id: &str) -> Result<TradePlan, DomainError> {
        self.plan_uc.activate(id)
    }

    /// Close an active plan. Emits the outcome and refreshes the
    /// pattern's lesson from the updated outcome set.
    pub fn close_plan(
        &self,
        id: &str,
        exit_price: f64,
        reason: ClosedReason,
    ) -> Result<(TradePlan, TradeOutcome), DomainError> {
        let (plan, outcome) = self.plan_uc.close(id, exit_price, reason)?;
        self.lessons_uc.extract_for_pattern(plan.pattern)?;
        Ok((plan, outcome))
    }

    pub fn cancel_plan(&self, id: &str) -> Result<TradePlan, DomainError> {
        self.plan_uc.cancel(id)
    }

    pub fn plan(&self, id: &str) -> Result<Option<TradePlan>, DomainError> {
        self.plan_uc.get(id)
    }

    pub fn plans(&self, filter: &PlanFilter) -> Result<Vec<TradePlan>, DomainError> {
        self.plan_uc.list(filter)
    }

    // ── Action graph ─────────────────────────────────────────────────

    pub fn plan_nodes(&self, trade_plan_id: &str) -> Result<Vec<ActionNode>, DomainError> {
        self.graph_uc.nodes_for(trade_plan_id)
    }

    pub fn replay(&self, trade_plan_id: &str) -> Result<ReplaySummary, DomainError> {
        self.graph_uc.replay(trade_plan_id)
    }

    // ── Signals & lessons ────────────────────────────────────────────

    pub fn signals_for_pattern(
        &self,
        pattern: PatternId,
        limit: usize,
    ) -> Result<Vec<Signal>, DomainError> {
        self.signals.for_pattern(pattern, limit)
    }

    pub fn lessons(&self) -> Result<Vec<Lesson>, DomainError> {
        self.lessons_uc.list()
    }

    pub fn extract_lessons(&self) -> Result<Vec<Lesson>, DomainError> {
        self.lessons_uc.extract_all()
    }
}
