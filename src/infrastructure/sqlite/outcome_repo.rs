use super::signal_repo::{lock, parse_col, parse_rfc3339};
use crate::domain::entities::outcome::TradeOutcome;
use crate::domain::error::DomainError;
use crate::domain::ports::lesson_repository::OutcomeRepository;
use crate::domain::values::pattern::PatternId;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SqliteOutcomeRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteOutcomeRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_outcome(row: &rusqlite::Row) -> Result<TradeOutcome, rusqlite::Error> {
        let pattern: String = row.get(1)?;
        let reason: String = row.get(4)?;
        let closed: String = row.get(5)?;

        Ok(TradeOutcome {
            trade_plan_id: row.get(0)?,
            pattern: parse_col(&pattern)?,
            realized_pnl_usd: row.get(2)?,
            realized_r: row.get(3)?,
            closed_reason: parse_col(&reason)?,
            closed_at: parse_rfc3339(&closed)?,
        })
    }
}

impl OutcomeRepository for SqliteOutcomeRepo {
    fn save(&self, outcome: &TradeOutcome) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT OR REPLACE INTO trade_outcomes \
             (trade_plan_id, pattern, realized_pnl_usd, realized_r, closed_reason, closed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                outcome.trade_plan_id,
                outcome.pattern.to_string(),
                outcome.realized_pnl_usd,
                outcome.realized_r,
                outcome.closed_reason.to_string(),
                outcome.closed_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save outcome: {e}")))?;
        Ok(())
    }

    fn get(&self, trade_plan_id: &str) -> Result<Option<TradeOutcome>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT trade_plan_id, pattern, realized_pnl_usd, realized_r, closed_reason, \
                 closed_at FROM trade_outcomes WHERE trade_plan_id = ?1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![trade_plan_id], Self::row_to_outcome)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows
            .next()
            .transpose()
            .map_err(|e| DomainError::Parse(e.to_string()))?)
    }

    fn for_pattern(&self, pattern: PatternId) -> Result<Vec<TradeOutcome>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT trade_plan_id, pattern, realized_pnl_usd, realized_r, closed_reason, \
                 closed_at FROM trade_outcomes WHERE pattern = ?1 \
                 ORDER BY closed_at ASC, rowid ASC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let outcomes = stmt
            .query_map(params![pattern.to_string()], Self::row_to_outcome)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(outcomes)
    }

    fn patterns_with_outcomes(&self) -> Result<Vec<PatternId>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT pattern FROM trade_outcomes ORDER BY pattern ASC")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let patterns = stmt
            .query_map([], |row| {
                let s: String = row.get(0)?;
                parse_col(&s)
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(patterns)
    }
}
