use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS signals (
            id TEXT PRIMARY KEY,
            pattern TEXT NOT NULL,
            address TEXT NOT NULL,
            chain TEXT NOT NULL,
            timeframe TEXT NOT NULL,
            direction TEXT NOT NULL,
            entry_price REAL NOT NULL,
            structural_stop REAL NOT NULL,
            confidence REAL NOT NULL,
            thesis TEXT NOT NULL,
            regime TEXT NOT NULL,
            detected_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trade_plans (
            id TEXT PRIMARY KEY,
            signal_id TEXT NOT NULL,
            pattern TEXT NOT NULL,
            address TEXT NOT NULL,
            timeframe TEXT NOT NULL,
            direction TEXT NOT NULL,
            entry REAL NOT NULL,
            stop_loss REAL NOT NULL,
            take_profits TEXT NOT NULL DEFAULT '[]',
            size_usd REAL NOT NULL,
            risk_percent REAL NOT NULL,
            expectancy_r REAL NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            activated_at TEXT,
            closed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS action_nodes (
            id TEXT PRIMARY KEY,
            trade_plan_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            payload TEXT NOT NULL DEFAULT '{}',
            parent_id TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trade_outcomes (
            trade_plan_id TEXT PRIMARY KEY,
            pattern TEXT NOT NULL,
            realized_pnl_usd REAL NOT NULL,
            realized_r REAL NOT NULL,
            closed_reason TEXT NOT NULL,
            closed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id TEXT PRIMARY KEY,
            pattern TEXT NOT NULL UNIQUE,
            score REAL NOT NULL,
            win_rate REAL NOT NULL,
            avg_r REAL NOT NULL,
            avg_win_r REAL NOT NULL,
            avg_loss_r REAL NOT NULL,
            sample_size INTEGER NOT NULL,
            summary TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_signals_pattern ON signals(pattern);
        CREATE INDEX IF NOT EXISTS idx_plans_status ON trade_plans(status);
        CREATE INDEX IF NOT EXISTS idx_plans_pattern ON trade_plans(pattern);
        CREATE INDEX IF NOT EXISTS idx_nodes_plan ON action_nodes(trade_plan_id);
        CREATE INDEX IF NOT EXISTS idx_outcomes_pattern ON trade_outcomes(pattern);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
