use crate::domain::entities::action_node::ActionNode;
use crate::domain::error::DomainError;

/// Append-only store for action-graph nodes.
///
/// `append` must reject, with `DomainError::PersistenceConflict` and
/// without touching the chain, any node whose `parent_id` does not
/// resolve to an existing node of the same `trade_plan_id` — and any
/// parentless node that is not a `detect` root. Nodes are never updated
/// or deleted.
pub trait ActionNodeRepository: Send + Sync {
    fn append(&self, node: &ActionNode) -> Result<(), DomainError>;

    /// Causally ordered chain: by `created_at`, ties by insertion order.
    fn nodes_for(&self, trade_plan_id: &str) -> Result<Vec<ActionNode>, DomainError>;
}
