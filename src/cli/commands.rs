use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tradetrail", about = "Deterministic, replayable trade decision trail")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one evaluation cycle for a pool
    Evaluate {
        /// Pool address
        address: String,
        /// Network the pool lives on
        #[arg(long, default_value = "solana")]
        chain: String,
        /// Candle interval (5m/15m/1h/4h/1d)
        #[arg(long, default_value = "1h")]
        timeframe: String,
        /// Account equity in USD
        #[arg(long)]
        equity: f64,
        /// Risk per trade in percent (default 1)
        #[arg(long)]
        risk: Option<f64>,
    },
    /// List trade plans
    Plans {
        /// Filter by status (proposed/active/closed/cancelled)
        #[arg(long)]
        status: Option<String>,
        /// Filter by pattern
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Mark a proposed plan active
    Activate {
        /// Plan ID
        id: String,
    },
    /// Close an active plan and record its outcome
    Close {
        /// Plan ID
        id: String,
        #[arg(long)]
        exit_price: f64,
        /// Why it closed (target/stop/manual/expiry)
        #[arg(long, default_value = "manual")]
        reason: String,
    },
    /// Cancel a proposed plan
    Cancel {
        /// Plan ID
        id: String,
    },
    /// Show a plan's action-graph chain
    Nodes {
        /// Plan ID
        plan_id: String,
    },
    /// Replay a plan's lifecycle from its action graph
    Replay {
        /// Plan ID
        plan_id: String,
    },
    /// Recent signals for a pattern
    Signals {
        /// Pattern (breakout, liquidity-sweep, order-block, fair-value-gap, ma-cross)
        pattern: String,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show stored lessons
    Lessons,
    /// Recompute lessons from all recorded outcomes
    ExtractLessons,
}
