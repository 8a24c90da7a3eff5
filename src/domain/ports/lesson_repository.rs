use crate::domain::entities::lesson::Lesson;
use crate::domain::entities::outcome::TradeOutcome;
use crate::domain::error::DomainError;
use crate::domain::values::pattern::PatternId;

pub trait OutcomeRepository: Send + Sync {
    /// One outcome per plan; saving again for the same plan replaces it.
    fn save(&self, outcome: &TradeOutcome) -> Result<(), DomainError>;
    fn get(&self, trade_plan_id: &str) -> Result<Option<TradeOutcome>, DomainError>;
    /// Ordered by `closed_at` then insertion order, so aggregation over
    /// an unchanged set is deterministic.
    fn for_pattern(&self, pattern: PatternId) -> Result<Vec<TradeOutcome>, DomainError>;
    /// Patterns that have at least one recorded outcome.
    fn patterns_with_outcomes(&self) -> Result<Vec<PatternId>, DomainError>;
}

pub trait LessonRepository: Send + Sync {
    fn upsert(&self, lesson: &Lesson) -> Result<(), DomainError>;
    fn for_pattern(&self, pattern: PatternId) -> Result<Option<Lesson>, DomainError>;
    fn list(&self) -> Result<Vec<Lesson>, DomainError>;
}
