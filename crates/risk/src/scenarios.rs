//! Preset test scenarios per standard.

use serde::Serialize;
use types::{RiskFactors, TestParameters};

use crate::factors::risk_factors;

/// A named, fixed parameter set tied to a standard's test method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub standard: &'static str,
    pub method: &'static str,
    pub duration_hours: u32,
    pub parameters: TestParameters,
}

impl Scenario {
    /// Display-rule risk for this preset.
    pub fn risk_factors(&self) -> RiskFactors {
        risk_factors(&self.parameters)
    }
}

const fn scenario(
    name: &'static str,
    standard: &'static str,
    method: &'static str,
    duration_hours: u32,
    temperature: f64,
    humidity: f64,
    vibration: f64,
) -> Scenario {
    Scenario {
        name,
        standard,
        method,
        duration_hours,
        parameters: TestParameters {
            temperature,
            humidity,
            vibration,
            pressure: 1013.0,
        },
    }
}

const MIL_STD_810: [Scenario; 4] = [
    scenario("High temperature", "MIL-STD-810", "501.7", 6, 65.0, 50.0, 5.0),
    scenario("High humidity", "MIL-STD-810", "507.6", 24, 25.0, 90.0, 5.0),
    scenario("High vibration", "MIL-STD-810", "514.7", 2, 25.0, 50.0, 35.0),
    scenario("Combined", "MIL-STD-810", "520.3", 4, 60.0, 85.0, 25.0),
];

const ISO_16750: [Scenario; 4] = [
    scenario("High temperature", "ISO 16750", "5.1.1", 8, 70.0, 45.0, 3.0),
    scenario("High humidity", "ISO 16750", "5.2.1", 48, 30.0, 95.0, 3.0),
    scenario("High vibration", "ISO 16750", "5.3.1", 1, 30.0, 45.0, 40.0),
    scenario("Combined", "ISO 16750", "5.4.1", 6, 65.0, 80.0, 20.0),
];

const IEC_60068: [Scenario; 4] = [
    scenario("High temperature", "IEC 60068", "2-14", 5, 60.0, 40.0, 4.0),
    scenario("High humidity", "IEC 60068", "2-30", 12, 25.0, 85.0, 4.0),
    scenario("High vibration", "IEC 60068", "2-6", 3, 25.0, 40.0, 30.0),
    scenario("Combined", "IEC 60068", "2-1", 4, 55.0, 75.0, 15.0),
];

/// Presets for `standard` (case-insensitive). Unknown standards get the
/// MIL-STD-810 set.
pub fn scenarios(standard: &str) -> &'static [Scenario] {
    if standard.eq_ignore_ascii_case("ISO 16750") {
        &ISO_16750
    } else if standard.eq_ignore_ascii_case("IEC 60068") {
        &IEC_60068
    } else {
        &MIL_STD_810
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_presets_per_standard() {
        for name in ["MIL-STD-810", "ISO 16750", "IEC 60068"] {
            let set = scenarios(name);
            assert_eq!(set.len(), 4);
            assert!(set.iter().all(|s| s.standard == name));
            assert!(set.iter().all(|s| s.parameters.pressure == 1013.0));
        }
    }

    #[test]
    fn test_unknown_standard_falls_back() {
        assert_eq!(scenarios("DO-160"), scenarios("MIL-STD-810"));
        assert_eq!(scenarios("iec 60068")[0].method, "2-14");
    }

    #[test]
    fn test_preset_risk() {
        let high_temp = &scenarios("MIL-STD-810")[0];
        assert_eq!(high_temp.risk_factors().temperature_risk, 0.95);
        assert!((high_temp.risk_factors().total_risk - 0.3).abs() < 1e-12);

        let combined = &scenarios("MIL-STD-810")[3];
        let f = combined.risk_factors();
        assert_eq!(f.components(), [0.95, 0.85, 0.5, 0.05]);
    }
}
