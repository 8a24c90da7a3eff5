use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a plan left the `active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosedReason {
    /// A take-profit level was hit.
    Target,
    /// The stop-loss was hit.
    Stop,
    /// Discretionary close by the operator.
    Manual,
    /// The setup timed out without resolving.
    Expiry,
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosedReason::Target => write!(f, "target"),
            ClosedReason::Stop => write!(f, "stop"),
            ClosedReason::Manual => write!(f, "manual"),
            ClosedReason::Expiry => write!(f, "expiry"),
        }
    }
}

impl FromStr for ClosedReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "target" => Ok(ClosedReason::Target),
            "stop" => Ok(ClosedReason::Stop),
            "manual" => Ok(ClosedReason::Manual),
            "expiry" => Ok(ClosedReason::Expiry),
            _ => Err(format!("Unknown close reason: {s}")),
        }
    }
}
