use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::values::pattern::PatternId;

pub trait SignalRepository: Send + Sync {
    /// Upsert keyed by the signal's deterministic tick id — re-evaluating
    /// a tick replaces that tick's signal instead of duplicating it.
    fn save(&self, signal: &Signal) -> Result<(), DomainError>;
    fn get_by_id(&self, id: &str) -> Result<Option<Signal>, DomainError>;
    fn for_pattern(&self, pattern: PatternId, limit: usize) -> Result<Vec<Signal>, DomainError>;
}
