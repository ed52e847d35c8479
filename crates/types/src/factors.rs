//! Per-factor risk fractions.

use serde::{Deserialize, Serialize};

/// Normalized risk attributed to each parameter, plus the combined score.
///
/// Recomputed on every query; never cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub temperature_risk: f64,
    pub humidity_risk: f64,
    pub vibration_risk: f64,
    pub pressure_risk: f64,
    /// Equal-weighted mean of the four factors unless overridden for display.
    pub total_risk: f64,
}

impl RiskFactors {
    /// Build from the four component risks; `total_risk` is their mean.
    pub fn from_components(
        temperature_risk: f64,
        humidity_risk: f64,
        vibration_risk: f64,
        pressure_risk: f64,
    ) -> Self {
        let total_risk = (temperature_risk + humidity_risk + vibration_risk + pressure_risk) / 4.0;
        Self {
            temperature_risk,
            humidity_risk,
            vibration_risk,
            pressure_risk,
            total_risk,
        }
    }

    /// Component risks in feature order.
    pub fn components(&self) -> [f64; 4] {
        [
            self.temperature_risk,
            self.humidity_risk,
            self.vibration_risk,
            self.pressure_risk,
        ]
    }

    /// Replace the total with a model-provided score (display only).
    pub fn with_total_override(mut self, risk_score: f64) -> Self {
        self.total_risk = risk_score.clamp(0.0, 1.0);
        self
    }

    /// Largest single component.
    pub fn max_component(&self) -> f64 {
        self.components().into_iter().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_mean() {
        let f = RiskFactors::from_components(0.2, 0.95, 0.1, 0.05);
        assert_eq!(f.total_risk, (0.2 + 0.95 + 0.1 + 0.05) / 4.0);
        assert_eq!(f.max_component(), 0.95);
    }

    #[test]
    fn test_override_clamps() {
        let f = RiskFactors::from_components(0.1, 0.1, 0.1, 0.05).with_total_override(1.4);
        assert_eq!(f.total_risk, 1.0);
        assert_eq!(f.temperature_risk, 0.1);
    }
}
