//! Risk assessment data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    LowRisk,
    HighRisk,
}

impl RiskLabel {
    /// Map a predicted outcome to its label (1 = diabetes indicators present).
    pub fn from_outcome(outcome: u8) -> Self {
        if outcome == 1 {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        }
    }

    pub fn outcome(&self) -> u8 {
        match self {
            RiskLabel::LowRisk => 0,
            RiskLabel::HighRisk => 1,
        }
    }

    /// Human-readable summary line
    pub fn summary(&self) -> &'static str {
        match self {
            RiskLabel::LowRisk => "Low Risk - No Diabetes Indicators",
            RiskLabel::HighRisk => "High Risk - Diabetes Indicators Present",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::LowRisk => f.write_str("low_risk"),
            RiskLabel::HighRisk => f.write_str("high_risk"),
        }
    }
}

/// Result of scoring one patient record against a trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Predicted classification
    pub label: RiskLabel,

    /// Predicted probability of the high-risk class (0.0 - 1.0); for a
    /// forest, the mean of the trees' leaf class probabilities
    pub high_risk_probability: f64,

    /// Held-out accuracy of the model that produced this assessment (0 - 100)
    pub accuracy_percent: f64,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// Create a new assessment
    pub fn new(label: RiskLabel, high_risk_probability: f64, accuracy_percent: f64) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            label,
            high_risk_probability,
            accuracy_percent,
            assessed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_outcome() {
        assert_eq!(RiskLabel::from_outcome(0), RiskLabel::LowRisk);
        assert_eq!(RiskLabel::from_outcome(1), RiskLabel::HighRisk);
        assert_eq!(RiskLabel::HighRisk.outcome(), 1);
        assert_eq!(RiskLabel::LowRisk.to_string(), "low_risk");
    }

    #[test]
    fn test_assessment_serialization() {
        let assessment = RiskAssessment::new(RiskLabel::HighRisk, 0.73, 81.2);

        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["label"], "high_risk");
        assert_eq!(json["accuracy_percent"], 81.2);

        let deserialized: RiskAssessment = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized.assessment_id, assessment.assessment_id);
        assert_eq!(deserialized.label, RiskLabel::HighRisk);
    }
}
