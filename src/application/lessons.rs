//! Lesson extraction.
//!
//! Batch recomputation of per-pattern performance aggregates from the
//! full outcome set. Idempotent by construction: the aggregate is a pure
//! function of the outcomes (including `updated_at`, which is the newest
//! contributing `closed_at` rather than wall-clock time), so re-running
//! over an unchanged set produces a bit-identical lesson.

use crate::domain::entities::lesson::Lesson;
use crate::domain::entities::outcome::TradeOutcome;
use crate::domain::error::DomainError;
use crate::domain::ports::lesson_repository::{LessonRepository, OutcomeRepository};
use crate::domain::values::pattern::PatternId;
use std::sync::Arc;

/// Sample-size floor for the shrinkage weight: with `n` outcomes the
/// score is `win_rate × n / (n + MIN_SAMPLE)`, so a 100% win rate over
/// two trades scores well below a 60% rate over forty.
pub const MIN_SAMPLE: f64 = 5.0;

pub struct LessonsUseCase {
    outcomes: Arc<dyn OutcomeRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl LessonsUseCase {
    pub fn new(outcomes: Arc<dyn OutcomeRepository>, lessons: Arc<dyn LessonRepository>) -> Self {
        Self { outcomes, lessons }
    }

    /// Recompute and upsert one pattern's lesson. `None` when the pattern
    /// has no outcomes yet — nothing is written in that case.
    pub fn extract_for_pattern(
        &self,
        pattern: PatternId,
    ) -> Result<Option<Lesson>, DomainError> {
        let outcomes = self.outcomes.for_pattern(pattern)?;
        if outcomes.is_empty() {
            return Ok(None);
        }
        let lesson = aggregate(pattern, &outcomes);
        self.lessons.upsert(&lesson)?;
        Ok(Some(lesson))
    }

    /// Batch entry point: recompute every pattern that has outcomes.
    pub fn extract_all(&self) -> Result<Vec<Lesson>, DomainError> {
        let mut extracted = Vec::new();
        for pattern in self.outcomes.patterns_with_outcomes()? {
            if let Some(lesson) = self.extract_for_pattern(pattern)? {
                extracted.push(lesson);
            }
        }
        Ok(extracted)
    }

    pub fn list(&self) -> Result<Vec<Lesson>, DomainError> {
        self.lessons.list()
    }

    pub fn for_pattern(&self, pattern: PatternId) -> Result<Option<Lesson>, DomainError> {
        self.lessons.for_pattern(pattern)
    }
}

/// Pure aggregation over an ordered outcome set.
pub fn aggregate(pattern: PatternId, outcomes: &[TradeOutcome]) -> Lesson {
    let n = outcomes.len();
    let wins: Vec<f64> = outcomes
        .iter()
        .filter(|o| o.is_win())
        .map(|o| o.realized_r)
        .collect();
    let losses: Vec<f64> = outcomes
        .iter()
        .filter(|o| !o.is_win())
        .map(|o| o.realized_r.abs())
        .collect();

    let win_rate = wins.len() as f64 / n as f64;
    let avg_r = outcomes.iter().map(|o| o.realized_r).sum::<f64>() / n as f64;
    let avg_win_r = mean(&wins);
    let avg_loss_r = mean(&losses);
    let score = win_rate * n as f64 / (n as f64 + MIN_SAMPLE);

    let updated_at = outcomes
        .iter()
        .map(|o| o.closed_at)
        .max()
        .expect("non-empty outcome set");

    Lesson {
        id: Lesson::id_for(pattern),
        pattern,
        score,
        win_rate,
        avg_r,
        avg_win_r,
        avg_loss_r,
        sample_size: n,
        summary: format!(
            "{pattern}: {n} closed trades, {:.0}% win rate, {:+.2}R average",
            win_rate * 100.0,
            avg_r
        ),
        updated_at,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
