use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage an action node records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Detect,
    RiskCheck,
    Plan,
    Execute,
    Close,
    Cancel,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Detect => write!(f, "detect"),
            NodeKind::RiskCheck => write!(f, "risk_check"),
            NodeKind::Plan => write!(f, "plan"),
            NodeKind::Execute => write!(f, "execute"),
            NodeKind::Close => write!(f, "close"),
            NodeKind::Cancel => write!(f, "cancel"),
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detect" => Ok(NodeKind::Detect),
            "risk_check" => Ok(NodeKind::RiskCheck),
            "plan" => Ok(NodeKind::Plan),
            "execute" => Ok(NodeKind::Execute),
            "close" => Ok(NodeKind::Close),
            "cancel" => Ok(NodeKind::Cancel),
            _ => Err(format!("Unknown node kind: {s}")),
        }
    }
}

/// One immutable event in a trade's causal chain. Chains are rooted at a
/// parentless `detect` node; every other node references its parent in
/// the same chain. Corrections are new nodes, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionNode {
    pub id: String,
    pub trade_plan_id: String,
    pub kind: NodeKind,
    pub payload: serde_json::Value,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActionNode {
    /// Chain root. Only `detect` nodes may be parentless.
    pub fn root(trade_plan_id: String, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trade_plan_id,
            kind: NodeKind::Detect,
            payload,
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn child(
        trade_plan_id: String,
        kind: NodeKind,
        payload: serde_json::Value,
        parent_id: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trade_plan_id,
            kind,
            payload,
            parent_id: Some(parent_id),
            created_at: Utc::now(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
