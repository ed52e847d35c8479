//! Risk levels and test-planning recommendations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse band for a total risk or a model risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Low below 0.3, Medium below 0.6, High otherwise.
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            RiskLevel::Low
        } else if score < 0.6 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const HIGH_RISK: &[&str] = &[
    "High risk: prepare a detailed test plan.",
    "Shorten the test duration.",
    "Monitor the unit continuously.",
    "Keep spare equipment on hand.",
];

const MEDIUM_HIGH_RISK: &[&str] = &[
    "Medium-high risk: test with care.",
    "Ramp test parameters up in stages.",
    "Define regular checkpoints.",
];

const MEDIUM_RISK: &[&str] = &[
    "Medium risk: the standard test procedure applies.",
    "Test duration can stay nominal.",
];

const LOW_RISK: &[&str] = &[
    "Low risk: test conditions are safe.",
    "The standard test protocol applies.",
];

/// Planning guidance for a risk score. Tiers are strict: a score of exactly
/// 0.8 gets the medium-high tier.
pub fn recommendations(risk_score: f64) -> &'static [&'static str] {
    if risk_score > 0.8 {
        HIGH_RISK
    } else if risk_score > 0.6 {
        MEDIUM_HIGH_RISK
    } else if risk_score > 0.4 {
        MEDIUM_RISK
    } else {
        LOW_RISK
    }
}
