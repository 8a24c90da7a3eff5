use super::signal_repo::{lock, parse_col, parse_rfc3339};
use crate::domain::entities::trade_plan::TradePlan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::{PlanFilter, PlanRepository};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const COLUMNS: &str = "id, signal_id, pattern, address, timeframe, direction, entry, stop_loss, \
     take_profits, size_usd, risk_percent, expectancy_r, status, created_at, activated_at, closed_at";

pub struct SqlitePlanRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlanRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_plan(row: &rusqlite::Row) -> Result<TradePlan, rusqlite::Error> {
        let pattern: String = row.get(2)?;
        let timeframe: String = row.get(4)?;
        let direction: String = row.get(5)?;
        let take_profits: String = row.get(8)?;
        let status: String = row.get(12)?;
        let created: String = row.get(13)?;
        let activated: Option<String> = row.get(14)?;
        let closed: Option<String> = row.get(15)?;

        Ok(TradePlan {
            id: row.get(0)?,
            signal_id: row.get(1)?,
            pattern: parse_col(&pattern)?,
            address: row.get(3)?,
            timeframe: parse_col(&timeframe)?,
            direction: parse_col(&direction)?,
            entry: row.get(6)?,
            stop_loss: row.get(7)?,
            take_profits: serde_json::from_str(&take_profits)
                .map_err(|_| rusqlite::Error::InvalidParameterName(take_profits.clone()))?,
            size_usd: row.get(9)?,
            risk_percent: row.get(10)?,
            expectancy_r: row.get(11)?,
            status: parse_col(&status)?,
            created_at: parse_rfc3339(&created)?,
            activated_at: activated.as_deref().map(parse_rfc3339).transpose()?,
            closed_at: closed.as_deref().map(parse_rfc3339).transpose()?,
        })
    }

    fn bind(plan: &TradePlan) -> Result<[Box<dyn rusqlite::types::ToSql>; 16], DomainError> {
        let take_profits = serde_json::to_string(&plan.take_profits)
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok([
            Box::new(plan.id.clone()),
            Box::new(plan.signal_id.clone()),
            Box::new(plan.pattern.to_string()),
            Box::new(plan.address.clone()),
            Box::new(plan.timeframe.to_string()),
            Box::new(plan.direction.to_string()),
            Box::new(plan.entry),
            Box::new(plan.stop_loss),
            Box::new(take_profits),
            Box::new(plan.size_usd),
            Box::new(plan.risk_percent),
            Box::new(plan.expectancy_r),
            Box::new(plan.status.to_string()),
            Box::new(plan.created_at.to_rfc3339()),
            Box::new(plan.activated_at.map(|dt| dt.to_rfc3339())),
            Box::new(plan.closed_at.map(|dt| dt.to_rfc3339())),
        ])
    }
}

impl PlanRepository for SqlitePlanRepo {
    fn save(&self, plan: &TradePlan) -> Result<(), DomainError> {
        let values = Self::bind(plan)?;
        let refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let conn = lock(&self.conn)?;
        conn.execute(
            &format!(
                "INSERT INTO trade_plans ({COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            refs.as_slice(),
        )
        .map_err(|e| DomainError::Database(format!("Failed to save plan: {e}")))?;
        Ok(())
    }

    fn update(&self, plan: &TradePlan) -> Result<(), DomainError> {
        let values = Self::bind(plan)?;
        let refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let conn = lock(&self.conn)?;
        let rows = conn
            .execute(
                "UPDATE trade_plans SET signal_id = ?2, pattern = ?3, address = ?4, \
                 timeframe = ?5, direction = ?6, entry = ?7, stop_loss = ?8, take_profits = ?9, \
                 size_usd = ?10, risk_percent = ?11, expectancy_r = ?12, status = ?13, \
                 created_at = ?14, activated_at = ?15, closed_at = ?16 WHERE id = ?1",
                refs.as_slice(),
            )
            .map_err(|e| DomainError::Database(format!("Failed to update plan: {e}")))?;
        if rows == 0 {
            return Err(DomainError::NotFound(format!(
                "Trade plan not found: {}",
                plan.id
            )));
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<TradePlan>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM trade_plans WHERE id = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_plan)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows
            .next()
            .transpose()
            .map_err(|e| DomainError::Parse(e.to_string()))?)
    }

    fn list(&self, filter: &PlanFilter) -> Result<Vec<TradePlan>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut sql = format!("SELECT {COLUMNS} FROM trade_plans WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        if let Some(pattern) = filter.pattern {
            sql.push_str(&format!(" AND pattern = ?{}", param_values.len() + 1));
            param_values.push(Box::new(pattern.to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let plans = stmt
            .query_map(refs.as_slice(), Self::row_to_plan)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(plans)
    }
}
