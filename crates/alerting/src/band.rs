//! Risk Bands

use serde::{Deserialize, Serialize};

/// Probability interval mapped to a severity label
///
/// Bands are open on the lower bound and closed on the upper bound, except
/// the two ends: exactly 0 is `None` and anything at or above 1 is `Extreme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// p == 0
    None,
    /// 0 < p <= 0.2
    Low,
    /// 0.2 < p <= 0.5
    Moderate,
    /// 0.5 < p <= 0.8
    High,
    /// 0.8 < p < 1
    VeryHigh,
    /// p >= 1
    Extreme,
}

impl RiskBand {
    /// Band for a probability in [0, 1]; `None` for NaN or negative input
    pub fn from_probability(probability: f64) -> Option<Self> {
        if probability.is_nan() || probability < 0.0 {
            return None;
        }

        let band = if probability == 0.0 {
            RiskBand::None
        } else if probability <= 0.2 {
            RiskBand::Low
        } else if probability <= 0.5 {
            RiskBand::Moderate
        } else if probability <= 0.8 {
            RiskBand::High
        } else if probability < 1.0 {
            RiskBand::VeryHigh
        } else {
            RiskBand::Extreme
        };
        Some(band)
    }

    /// Human-readable label returned to clients and stored with history
    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::None => "No immediate cardiac risk detected based on current input.",
            RiskBand::Low => "Low cardiac risk. Maintain a healthy lifestyle.",
            RiskBand::Moderate => {
                "Moderate cardiac risk. Lifestyle changes and monitoring recommended."
            }
            RiskBand::High => "High cardiac risk. Medical consultation advised.",
            RiskBand::VeryHigh => "Very high cardiac risk. Seek medical attention soon.",
            RiskBand::Extreme => {
                "Extremely high cardiac risk detected. Please visit the nearest hospital immediately."
            }
        }
    }

    /// Short machine name
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::None => "none",
            RiskBand::Low => "low",
            RiskBand::Moderate => "moderate",
            RiskBand::High => "high",
            RiskBand::VeryHigh => "very_high",
            RiskBand::Extreme => "extreme",
        }
    }
}
