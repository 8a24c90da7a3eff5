//! Action graph recording and replay.
//!
//! The only component with persistent side effects. Nodes are appended
//! through a per-chain mutex so the parent-must-exist check and the
//! insert cannot interleave for the same trade lifecycle; appends to
//! different chains proceed independently (no global lock). Replay is a
//! pure fold over the causally ordered node sequence.

use crate::domain::entities::action_node::{ActionNode, NodeKind};
use crate::domain::error::DomainError;
use crate::domain::ports::node_repository::ActionNodeRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ActionGraphUseCase {
    nodes: Arc<dyn ActionNodeRepository>,
    chain_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Result of replaying one chain.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub trade_plan_id: String,
    pub node_count: usize,
    /// Node kinds in causal order, e.g. detect → risk_check → plan.
    pub stages: Vec<NodeKind>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Set when the chain reached a terminal close/cancel node.
    pub terminal: Option<NodeKind>,
}

impl ActionGraphUseCase {
    pub fn new(nodes: Arc<dyn ActionNodeRepository>) -> Self {
        Self {
            nodes,
            chain_locks: Mutex::new(HashMap::new()),
        }
    }

    fn chain_lock(&self, trade_plan_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .chain_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(trade_plan_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append one node under its chain's writer lock.
    pub fn record(&self, node: ActionNode) -> Result<ActionNode, DomainError> {
        let lock = self.chain_lock(&node.trade_plan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.nodes.append(&node)?;
        Ok(node)
    }

    /// Start a chain with its root `detect` node.
    pub fn record_root(
        &self,
        trade_plan_id: String,
        payload: serde_json::Value,
    ) -> Result<ActionNode, DomainError> {
        self.record(ActionNode::root(trade_plan_id, payload))
    }

    /// Append a node whose parent is the current tail of the chain. The
    /// tail lookup and the insert run under the same chain lock.
    pub fn record_next(
        &self,
        trade_plan_id: &str,
        kind: NodeKind,
        payload: serde_json::Value,
    ) -> Result<ActionNode, DomainError> {
        let lock = self.chain_lock(trade_plan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let chain = self.nodes.nodes_for(trade_plan_id)?;
        let tail = chain.last().ok_or_else(|| {
            DomainError::PersistenceConflict(format!(
                "No chain exists for plan {trade_plan_id}; record a detect root first"
            ))
        })?;

        let node = ActionNode::child(trade_plan_id.to_string(), kind, payload, tail.id.clone());
        self.nodes.append(&node)?;
        Ok(node)
    }

    pub fn nodes_for(&self, trade_plan_id: &str) -> Result<Vec<ActionNode>, DomainError> {
        self.nodes.nodes_for(trade_plan_id)
    }

    /// Replay a chain for audit: a pure fold over the ordered sequence.
    pub fn replay(&self, trade_plan_id: &str) -> Result<ReplaySummary, DomainError> {
        let nodes = self.nodes.nodes_for(trade_plan_id)?;
        Ok(replay_nodes(trade_plan_id, &nodes))
    }
}

/// Fold an ordered node sequence into its lifecycle summary.
pub fn replay_nodes(trade_plan_id: &str, nodes: &[ActionNode]) -> ReplaySummary {
    let stages: Vec<NodeKind> = nodes.iter().map(|n| n.kind).collect();
    let terminal = stages
        .last()
        .filter(|k| matches!(k, NodeKind::Close | NodeKind::Cancel))
        .copied();

    ReplaySummary {
        trade_plan_id: trade_plan_id.to_string(),
        node_count: nodes.len(),
        stages,
        started_at: nodes.first().map(|n| n.created_at),
        ended_at: nodes.last().map(|n| n.created_at),
        terminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind, parent: Option<&str>) -> ActionNode {
        ActionNode {
            id: uuid::Uuid::new_v4().to_string(),
            trade_plan_id: "p1".into(),
            kind,
            payload: serde_json::json!({}),
            parent_id: parent.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_replay_empty_chain() {
        let summary = replay_nodes("p1", &[]);
        assert_eq!(summary.node_count, 0);
        assert!(summary.terminal.is_none());
        assert!(summary.started_at.is_none());
    }

    #[test]
    fn test_replay_full_lifecycle() {
        let root = node(NodeKind::Detect, None);
        let chain = vec![
            root.clone(),
            node(NodeKind::RiskCheck, Some(&root.id)),
            node(NodeKind::Plan, Some(&root.id)),
            node(NodeKind::Execute, Some(&root.id)),
            node(NodeKind::Close, Some(&root.id)),
        ];
        let summary = replay_nodes("p1", &chain);
        assert_eq!(summary.node_count, 5);
        assert_eq!(summary.stages[0], NodeKind::Detect);
        assert_eq!(summary.terminal, Some(NodeKind::Close));
    }
}
