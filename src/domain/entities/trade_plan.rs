use crate::domain::error::DomainError;
use crate::domain::values::direction::TradeDirection;
use crate::domain::values::pattern::PatternId;
use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plan lifecycle. Transitions are forward-only:
/// `proposed → active → closed` or `proposed → cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Proposed,
    Active,
    Closed,
    Cancelled,
}

impl PlanStatus {
    /// The single source of truth for the state machine.
    pub fn can_transition(&self, to: PlanStatus) -> bool {
        matches!(
            (self, to),
            (PlanStatus::Proposed, PlanStatus::Active)
                | (PlanStatus::Proposed, PlanStatus::Cancelled)
                | (PlanStatus::Active, PlanStatus::Closed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Closed | PlanStatus::Cancelled)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Proposed => write!(f, "proposed"),
            PlanStatus::Active => write!(f, "active"),
            PlanStatus::Closed => write!(f, "closed"),
            PlanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for PlanStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proposed" => Ok(PlanStatus::Proposed),
            "active" => Ok(PlanStatus::Active),
            "closed" => Ok(PlanStatus::Closed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            _ => Err(format!("Unknown plan status: {s}")),
        }
    }
}

/// An executable proposal derived from a signal: entry, stop, targets,
/// size, and expectancy metadata. Never deleted — superseded plans stay
/// in terminal states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradePlan {
    pub id: String,
    pub signal_id: String,
    pub pattern: PatternId,
    pub address: String,
    pub timeframe: Timeframe,
    pub direction: TradeDirection,
    pub entry: f64,
    pub stop_loss: f64,
    /// Ordered strictly away from entry in the trade direction.
    pub take_profits: Vec<f64>,
    pub size_usd: f64,
    pub risk_percent: f64,
    /// Expected value per trade in R-multiples, from the pattern's lesson
    /// prior (or the neutral default).
    pub expectancy_r: f64,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl TradePlan {
    pub fn stop_distance(&self) -> f64 {
        (self.entry - self.stop_loss).abs()
    }

    fn transition(&mut self, to: PlanStatus) -> Result<(), DomainError> {
        if !self.status.can_transition(to) {
            return Err(DomainError::InvalidInput(format!(
                "Plan {} cannot move {} -> {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        Ok(())
    }

    pub fn activate(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PlanStatus::Active)?;
        self.activated_at = Some(at);
        Ok(())
    }

    pub fn close(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PlanStatus::Closed)?;
        self.closed_at = Some(at);
        Ok(())
    }

    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PlanStatus::Cancelled)?;
        self.closed_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> TradePlan {
        TradePlan {
            id: "p1".into(),
            signal_id: "s1".into(),
            pattern: PatternId::Breakout,
            address: "0xabc".into(),
            timeframe: Timeframe::H1,
            direction: TradeDirection::Long,
            entry: 100.0,
            stop_loss: 95.0,
            take_profits: vec![105.0, 110.0],
            size_usd: 2000.0,
            risk_percent: 1.0,
            expectancy_r: 0.25,
            status: PlanStatus::Proposed,
            created_at: Utc::now(),
            activated_at: None,
            closed_at: None,
        }
    }

    #[test]
    fn test_forward_path() {
        let mut p = plan();
        p.activate(Utc::now()).unwrap();
        assert_eq!(p.status, PlanStatus::Active);
        p.close(Utc::now()).unwrap();
        assert_eq!(p.status, PlanStatus::Closed);
    }

    #[test]
    fn test_cancel_only_from_proposed() {
        let mut p = plan();
        p.cancel(Utc::now()).unwrap();
        assert_eq!(p.status, PlanStatus::Cancelled);

        let mut p = plan();
        p.activate(Utc::now()).unwrap();
        assert!(p.cancel(Utc::now()).is_err());
    }

    #[test]
    fn test_no_backward_or_duplicate_terminal() {
        let mut p = plan();
        p.activate(Utc::now()).unwrap();
        p.close(Utc::now()).unwrap();
        assert!(p.close(Utc::now()).is_err());
        assert!(p.activate(Utc::now()).is_err());
        assert!(p.cancel(Utc::now()).is_err());
    }

    #[test]
    fn test_close_requires_active() {
        let mut p = plan();
        assert!(p.close(Utc::now()).is_err());
        assert_eq!(p.status, PlanStatus::Proposed);
    }
}
