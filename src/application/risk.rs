//! Position sizing from a signal's structural level.
//!
//! `size_usd = equity × risk_percent / stop_distance`, with take-profit
//! levels at fixed R multiples beyond entry. Degenerate inputs
//! (non-positive equity, risk, or stop distance; stop on the wrong side
//! of entry) produce `InvalidPlanInputs` — no plan at all rather than a
//! malformed one.

use crate::domain::entities::signal::Signal;
use crate::domain::error::DomainError;
use crate::domain::values::direction::TradeDirection;
use serde::Serialize;

/// R multiples the targets sit at.
pub const TARGET_R_MULTIPLES: [f64; 2] = [1.0, 2.0];

/// Default risk per trade, in percent.
pub const DEFAULT_RISK_PERCENT: f64 = 1.0;

#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub stop_distance: f64,
    pub size_usd: f64,
    pub risk_percent: f64,
    /// Ordered strictly away from entry in the trade direction.
    pub take_profits: Vec<f64>,
}

pub fn size_position(
    signal: &Signal,
    account_equity: f64,
    risk_percent: f64,
) -> Result<RiskAssessment, DomainError> {
    if account_equity <= 0.0 {
        return Err(DomainError::InvalidPlanInputs(format!(
            "account equity must be positive, got {account_equity}"
        )));
    }
    if risk_percent <= 0.0 {
        return Err(DomainError::InvalidPlanInputs(format!(
            "risk percent must be positive, got {risk_percent}"
        )));
    }

    let entry = signal.entry_price;
    let stop = signal.structural_stop;
    let stop_distance = match signal.direction {
        TradeDirection::Long => entry - stop,
        TradeDirection::Short => stop - entry,
    };
    if stop_distance <= 0.0 {
        return Err(DomainError::InvalidPlanInputs(format!(
            "stop {stop} is not beyond entry {entry} for a {} trade",
            signal.direction
        )));
    }

    let size_usd = account_equity * risk_percent / stop_distance;
    let take_profits = TARGET_R_MULTIPLES
        .iter()
        .map(|r| entry + signal.direction.sign() * r * stop_distance)
        .collect();

    Ok(RiskAssessment {
        stop_distance,
        size_usd,
        risk_percent,
        take_profits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::confidence::Confidence;
    use crate::domain::values::pattern::PatternId;
    use crate::domain::values::regime::MarketRegime;
    use crate::domain::values::timeframe::Timeframe;
    use chrono::Utc;

    fn signal(direction: TradeDirection, entry: f64, stop: f64) -> Signal {
        Signal::new(
            PatternId::Breakout,
            "0xabc".into(),
            "solana".into(),
            Timeframe::H1,
            direction,
            entry,
            stop,
            Confidence::clamped(0.7),
            "test".into(),
            MarketRegime::neutral(Utc::now()),
            Utc::now(),
        )
    }

    #[test]
    fn test_reference_scenario() {
        // equity 10000, risk 1, entry 100, stop 95 -> distance 5, size 2000.
        let s = signal(TradeDirection::Long, 100.0, 95.0);
        let a = size_position(&s, 10_000.0, 1.0).unwrap();
        assert!((a.stop_distance - 5.0).abs() < 1e-9);
        assert!((a.size_usd - 2000.0).abs() < 1e-9);
        assert_eq!(a.take_profits, vec![105.0, 110.0]);
    }

    #[test]
    fn test_exact_formula() {
        let s = signal(TradeDirection::Short, 50.0, 52.5);
        let a = size_position(&s, 7_500.0, 0.5).unwrap();
        assert!((a.size_usd - 7_500.0 * 0.5 / 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_targets_descend() {
        let s = signal(TradeDirection::Short, 100.0, 104.0);
        let a = size_position(&s, 10_000.0, 1.0).unwrap();
        assert_eq!(a.take_profits, vec![96.0, 92.0]);
        assert!(a.take_profits.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_invalid_inputs_produce_no_plan() {
        let s = signal(TradeDirection::Long, 100.0, 95.0);
        assert!(matches!(
            size_position(&s, 0.0, 1.0),
            Err(DomainError::InvalidPlanInputs(_))
        ));
        assert!(matches!(
            size_position(&s, 10_000.0, 0.0),
            Err(DomainError::InvalidPlanInputs(_))
        ));

        // Stop on the wrong side of entry for the direction.
        let inverted = signal(TradeDirection::Long, 95.0, 100.0);
        assert!(matches!(
            size_position(&inverted, 10_000.0, 1.0),
            Err(DomainError::InvalidPlanInputs(_))
        ));
    }
}
