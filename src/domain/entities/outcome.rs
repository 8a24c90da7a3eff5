use crate::domain::entities::trade_plan::TradePlan;
use crate::domain::values::close_reason::ClosedReason;
use crate::domain::values::pattern::PatternId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Realized result of one closed plan. Emitted exactly once, on the
/// `active → closed` transition; cancelled plans emit nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub trade_plan_id: String,
    pub pattern: PatternId,
    pub realized_pnl_usd: f64,
    /// Profit or loss as a multiple of the amount initially risked.
    pub realized_r: f64,
    pub closed_reason: ClosedReason,
    pub closed_at: DateTime<Utc>,
}

impl TradeOutcome {
    /// Derive the outcome from a plan and its exit price. R is the signed
    /// move from entry divided by the stop distance; PnL scales the move
    /// by the position size.
    pub fn from_close(
        plan: &TradePlan,
        exit_price: f64,
        reason: ClosedReason,
        closed_at: DateTime<Utc>,
    ) -> Self {
        let stop_distance = plan.stop_distance();
        let signed_move = (exit_price - plan.entry) * plan.direction.sign();
        let realized_r = if stop_distance > 0.0 {
            signed_move / stop_distance
        } else {
            0.0
        };
        let realized_pnl_usd = if plan.entry > 0.0 {
            plan.size_usd * signed_move / plan.entry
        } else {
            0.0
        };

        Self {
            trade_plan_id: plan.id.clone(),
            pattern: plan.pattern,
            realized_pnl_usd,
            realized_r,
            closed_reason: reason,
            closed_at,
        }
    }

    pub fn is_win(&self) -> bool {
        self.realized_r > 0.0
    }
}
