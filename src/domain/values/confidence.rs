use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&value) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {value}"
            ));
        }
        Ok(Confidence(value))
    }

    /// Clamp into [0,1]. Rule confidence formulas pass through here, so a
    /// misbehaving rule can never produce an out-of-range signal.
    pub fn clamped(value: f64) -> Self {
        Confidence(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(1.1).is_err());
        assert!(Confidence::new(0.5).is_ok());
    }

    #[test]
    fn test_clamped_bounds() {
        assert_eq!(Confidence::clamped(3.7).value(), 1.0);
        assert_eq!(Confidence::clamped(-2.0).value(), 0.0);
        assert_eq!(Confidence::clamped(0.62).value(), 0.62);
    }
}
