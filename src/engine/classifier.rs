use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-tier delay risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Probability (percent) at which Medium starts
    pub const MEDIUM_THRESHOLD: f64 = 30.0;
    /// Probability (percent) at which High starts
    pub const HIGH_THRESHOLD: f64 = 60.0;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a calibrated delay probability (percent) to a risk tier
pub fn classify(delay_probability: f64) -> RiskLevel {
    if delay_probability < RiskLevel::MEDIUM_THRESHOLD {
        RiskLevel::Low
    } else if delay_probability < RiskLevel::HIGH_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(classify(0.0), RiskLevel::Low);
        assert_eq!(classify(29.9), RiskLevel::Low);
        assert_eq!(classify(30.0), RiskLevel::Medium);
        assert_eq!(classify(59.9), RiskLevel::Medium);
        assert_eq!(classify(60.0), RiskLevel::High);
        assert_eq!(classify(100.0), RiskLevel::High);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"Medium\"");
        assert!(RiskLevel::High > RiskLevel::Low);
    }
}
