//! Test parameters and the standard-wide limits they are checked against.
//!
//! The feature order defined here is shared by data generation, training and
//! inference. Use [`idx`] constants instead of magic numbers when indexing a
//! [`FeatureRow`].

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Number of model input features.
pub const N_FEATURES: usize = 4;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["temperature", "humidity", "vibration", "pressure"];

/// One model input row, ordered as [`FEATURE_NAMES`].
pub type FeatureRow = [f64; N_FEATURES];

/// Named feature indices.
pub mod idx {
    /// Temperature in °C.
    pub const TEMPERATURE: usize = 0;
    /// Relative humidity in %.
    pub const HUMIDITY: usize = 1;
    /// Vibration in g.
    pub const VIBRATION: usize = 2;
    /// Pressure in hPa.
    pub const PRESSURE: usize = 3;
}

// =============================================================================
// Parameter
// =============================================================================

/// One of the four environmental stress parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Temperature,
    Humidity,
    Vibration,
    Pressure,
}

impl Parameter {
    /// All parameters in feature order.
    pub const ALL: [Parameter; N_FEATURES] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Vibration,
        Parameter::Pressure,
    ];

    /// Column / feature name.
    pub fn name(&self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    /// Position in a [`FeatureRow`].
    pub fn index(&self) -> usize {
        match self {
            Parameter::Temperature => idx::TEMPERATURE,
            Parameter::Humidity => idx::HUMIDITY,
            Parameter::Vibration => idx::VIBRATION,
            Parameter::Pressure => idx::PRESSURE,
        }
    }

    /// Standard-wide limit for this parameter.
    pub fn limit(&self) -> ParameterLimit {
        STANDARD_LIMITS[self.index()]
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Limits
// =============================================================================

/// Inclusive range a parameter is expected to stay in, with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterLimit {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl ParameterLimit {
    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Limits covering MIL-STD-810, ISO 16750 and IEC 60068, in feature order.
pub const STANDARD_LIMITS: [ParameterLimit; N_FEATURES] = [
    ParameterLimit {
        min: -40.0,
        max: 70.0,
        unit: "°C",
    },
    ParameterLimit {
        min: 10.0,
        max: 95.0,
        unit: "%",
    },
    ParameterLimit {
        min: 0.1,
        max: 50.0,
        unit: "g",
    },
    ParameterLimit {
        min: 800.0,
        max: 1200.0,
        unit: "hPa",
    },
];

// =============================================================================
// TestParameters
// =============================================================================

/// Conditions an equipment test is run under.
///
/// Values outside [`STANDARD_LIMITS`] are allowed; they are flagged by
/// validation but still scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestParameters {
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// g
    pub vibration: f64,
    /// hPa
    pub pressure: f64,
}

impl TestParameters {
    pub fn new(temperature: f64, humidity: f64, vibration: f64, pressure: f64) -> Self {
        Self {
            temperature,
            humidity,
            vibration,
            pressure,
        }
    }

    /// Value of a single parameter.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Vibration => self.vibration,
            Parameter::Pressure => self.pressure,
        }
    }

    /// Model input row in [`FEATURE_NAMES`] order.
    pub fn to_features(&self) -> FeatureRow {
        [self.temperature, self.humidity, self.vibration, self.pressure]
    }

    /// Inverse of [`to_features`](Self::to_features).
    pub fn from_features(row: &FeatureRow) -> Self {
        Self::new(
            row[idx::TEMPERATURE],
            row[idx::HUMIDITY],
            row[idx::VIBRATION],
            row[idx::PRESSURE],
        )
    }
}

impl Default for TestParameters {
    /// Laboratory ambient: 25 °C, 50 %, 5 g, 1013 hPa.
    fn default() -> Self {
        Self::new(25.0, 50.0, 5.0, 1013.0)
    }
}

impl From<FeatureRow> for TestParameters {
    fn from(row: FeatureRow) -> Self {
        Self::from_features(&row)
    }
}

impl fmt::Display for TestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}°C | {}% | {}g | {}hPa",
            self.temperature, self.humidity, self.vibration, self.pressure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_matches_names() {
        let params = TestParameters::new(1.0, 2.0, 3.0, 4.0);
        let row = params.to_features();
        for p in Parameter::ALL {
            assert_eq!(row[p.index()], params.get(p));
            assert_eq!(FEATURE_NAMES[p.index()], p.name());
        }
        assert_eq!(TestParameters::from_features(&row), params);
    }

    #[test]
    fn test_limits_contain_bounds() {
        let temp = Parameter::Temperature.limit();
        assert!(temp.contains(-40.0));
        assert!(temp.contains(70.0));
        assert!(!temp.contains(70.01));
        assert_eq!(Parameter::Pressure.limit().unit, "hPa");
    }

    #[test]
    fn test_default_is_ambient() {
        let params = TestParameters::default();
        assert_eq!(params.to_features(), [25.0, 50.0, 5.0, 1013.0]);
    }
}
