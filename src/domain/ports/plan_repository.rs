use crate::domain::entities::trade_plan::{PlanStatus, TradePlan};
use crate::domain::error::DomainError;
use crate::domain::values::pattern::PatternId;

#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    pub status: Option<PlanStatus>,
    pub pattern: Option<PatternId>,
    pub limit: Option<usize>,
}

pub trait PlanRepository: Send + Sync {
    fn save(&self, plan: &TradePlan) -> Result<(), DomainError>;
    /// Full-row update; `NotFound` if the id does not exist.
    fn update(&self, plan: &TradePlan) -> Result<(), DomainError>;
    fn get(&self, id: &str) -> Result<Option<TradePlan>, DomainError>;
    fn list(&self, filter: &PlanFilter) -> Result<Vec<TradePlan>, DomainError>;
}
