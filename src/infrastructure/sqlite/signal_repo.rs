use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::values::confidence::Confidence;
use crate::domain::values::pattern::PatternId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const COLUMNS: &str = "id, pattern, address, chain, timeframe, direction, entry_price, \
     structural_stop, confidence, thesis, regime, detected_at";

pub struct SqliteSignalRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSignalRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_signal(row: &rusqlite::Row) -> Result<Signal, rusqlite::Error> {
        let pattern: String = row.get(1)?;
        let timeframe: String = row.get(4)?;
        let direction: String = row.get(5)?;
        let regime_json: String = row.get(10)?;
        let detected: String = row.get(11)?;

        Ok(Signal {
            id: row.get(0)?,
            pattern: parse_col(&pattern)?,
            address: row.get(2)?,
            chain: row.get(3)?,
            timeframe: parse_col(&timeframe)?,
            direction: parse_col(&direction)?,
            entry_price: row.get(6)?,
            structural_stop: row.get(7)?,
            confidence: Confidence::clamped(row.get(8)?),
            thesis: row.get(9)?,
            regime: serde_json::from_str(&regime_json)
                .map_err(|_| rusqlite::Error::InvalidParameterName(regime_json.clone()))?,
            detected_at: parse_rfc3339(&detected)?,
        })
    }
}

impl SignalRepository for SqliteSignalRepo {
    fn save(&self, signal: &Signal) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        let regime_json = serde_json::to_string(&signal.regime)
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        conn.execute(
            &format!("INSERT OR REPLACE INTO signals ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
            params![
                signal.id,
                signal.pattern.to_string(),
                signal.address,
                signal.chain,
                signal.timeframe.to_string(),
                signal.direction.to_string(),
                signal.entry_price,
                signal.structural_stop,
                signal.confidence.value(),
                signal.thesis,
                regime_json,
                signal.detected_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save signal: {e}")))?;
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Signal>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM signals WHERE id = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_signal)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().transpose().map_err(|e| DomainError::Parse(e.to_string()))?)
    }

    fn for_pattern(&self, pattern: PatternId, limit: usize) -> Result<Vec<Signal>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM signals WHERE pattern = ?1 ORDER BY detected_at DESC LIMIT ?2"
            ))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let signals = stmt
            .query_map(params![pattern.to_string(), limit as i64], Self::row_to_signal)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(signals)
    }
}

pub(crate) fn lock(
    conn: &Arc<Mutex<Connection>>,
) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
    conn.lock()
        .map_err(|e| DomainError::Database(e.to_string()))
}

pub(crate) fn parse_col<T: std::str::FromStr>(s: &str) -> Result<T, rusqlite::Error> {
    s.parse()
        .map_err(|_| rusqlite::Error::InvalidParameterName(s.to_string()))
}

pub(crate) fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidParameterName(s.to_string()))
}
