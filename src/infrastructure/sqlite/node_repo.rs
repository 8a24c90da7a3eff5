use super::signal_repo::{lock, parse_col, parse_rfc3339};
use crate::domain::entities::action_node::{ActionNode, NodeKind};
use crate::domain::error::DomainError;
use crate::domain::ports::node_repository::ActionNodeRepository;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SqliteNodeRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteNodeRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_node(row: &rusqlite::Row) -> Result<ActionNode, rusqlite::Error> {
        let kind: String = row.get(2)?;
        let payload: String = row.get(3)?;
        let created: String = row.get(5)?;

        Ok(ActionNode {
            id: row.get(0)?,
            trade_plan_id: row.get(1)?,
            kind: parse_col(&kind)?,
            payload: serde_json::from_str(&payload)
                .map_err(|_| rusqlite::Error::InvalidParameterName(payload.clone()))?,
            parent_id: row.get(4)?,
            created_at: parse_rfc3339(&created)?,
        })
    }
}

impl ActionNodeRepository for SqliteNodeRepo {
    /// Validate-then-insert runs on one locked connection, so the check
    /// and the write cannot interleave with another append.
    fn append(&self, node: &ActionNode) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;

        match &node.parent_id {
            None => {
                if node.kind != NodeKind::Detect {
                    return Err(DomainError::PersistenceConflict(format!(
                        "Node {} has no parent but kind {} — only detect nodes may root a chain",
                        node.id, node.kind
                    )));
                }
            }
            Some(parent_id) => {
                let parent_exists: bool = conn
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM action_nodes WHERE id = ?1 AND trade_plan_id = ?2)",
                        params![parent_id, node.trade_plan_id],
                        |row| row.get(0),
                    )
                    .map_err(|e| DomainError::Database(e.to_string()))?;
                if !parent_exists {
                    return Err(DomainError::PersistenceConflict(format!(
                        "Parent {} does not exist in chain {}",
                        parent_id, node.trade_plan_id
                    )));
                }
            }
        }

        let payload = serde_json::to_string(&node.payload)
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        conn.execute(
            "INSERT INTO action_nodes (id, trade_plan_id, kind, payload, parent_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                node.id,
                node.trade_plan_id,
                node.kind.to_string(),
                payload,
                node.parent_id,
                node.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to append node: {e}")))?;
        Ok(())
    }

    fn nodes_for(&self, trade_plan_id: &str) -> Result<Vec<ActionNode>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, trade_plan_id, kind, payload, parent_id, created_at \
                 FROM action_nodes WHERE trade_plan_id = ?1 \
                 ORDER BY created_at ASC, rowid ASC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let nodes = stmt
            .query_map(params![trade_plan_id], Self::row_to_node)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(nodes)
    }
}
