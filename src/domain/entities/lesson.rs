use crate::domain::values::pattern::PatternId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rolling performance aggregate for one pattern, recomputed from the
/// full outcome set. Monotonically accumulates evidence — never deleted,
/// only overwritten by a re-extraction.
///
/// `updated_at` is the newest contributing `closed_at`, not wall-clock
/// time, so extraction over an unchanged outcome set is bit-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub pattern: PatternId,
    /// Win rate shrunk toward zero on small samples:
    /// `win_rate × n / (n + MIN_SAMPLE)`.
    pub score: f64,
    pub win_rate: f64,
    pub avg_r: f64,
    /// Mean R of winning trades (0 when there are none).
    pub avg_win_r: f64,
    /// Mean |R| of losing trades (0 when there are none).
    pub avg_loss_r: f64,
    pub sample_size: usize,
    pub summary: String,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// One lesson per pattern, at a stable id.
    pub fn id_for(pattern: PatternId) -> String {
        format!("lesson-{pattern}")
    }
}
