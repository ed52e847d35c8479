//! Test outcome, test taxonomy and labeled samples.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::params::{FeatureRow, TestParameters};

// =============================================================================
// Verdict
// =============================================================================

/// Binary label value for PASS.
pub const LABEL_PASS: u8 = 0;
/// Binary label value for FAIL.
pub const LABEL_FAIL: u8 = 1;

/// Outcome of an equipment test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Class index used by the classifiers (PASS = 0, FAIL = 1).
    pub fn label(&self) -> u8 {
        match self {
            Verdict::Pass => LABEL_PASS,
            Verdict::Fail => LABEL_FAIL,
        }
    }

    /// Any non-zero label maps to FAIL.
    pub fn from_label(label: u8) -> Self {
        if label == LABEL_PASS {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Taxonomy
// =============================================================================

/// Stress family a test belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    Temperature,
    Humidity,
    Vibration,
}

impl TestCategory {
    pub const ALL: [TestCategory; 3] = [
        TestCategory::Temperature,
        TestCategory::Humidity,
        TestCategory::Vibration,
    ];

    /// Test types in this category.
    pub fn test_types(&self) -> &'static [TestType] {
        match self {
            TestCategory::Temperature => &[
                TestType::HighTemp,
                TestType::LowTemp,
                TestType::ThermalShock,
            ],
            TestCategory::Humidity => &[
                TestType::HumidityResistance,
                TestType::Condensation,
                TestType::WaterSplash,
            ],
            TestCategory::Vibration => &[
                TestType::MechanicalVibration,
                TestType::AcousticVibration,
                TestType::Shock,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestCategory::Temperature => "temperature",
            TestCategory::Humidity => "humidity",
            TestCategory::Vibration => "vibration",
        }
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete test procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    HighTemp,
    LowTemp,
    ThermalShock,
    HumidityResistance,
    Condensation,
    WaterSplash,
    MechanicalVibration,
    AcousticVibration,
    Shock,
}

impl TestType {
    pub fn category(&self) -> TestCategory {
        match self {
            TestType::HighTemp | TestType::LowTemp | TestType::ThermalShock => {
                TestCategory::Temperature
            }
            TestType::HumidityResistance | TestType::Condensation | TestType::WaterSplash => {
                TestCategory::Humidity
            }
            TestType::MechanicalVibration | TestType::AcousticVibration | TestType::Shock => {
                TestCategory::Vibration
            }
        }
    }

    /// Reference standard and method the test is run against.
    pub fn standard(&self) -> &'static str {
        match self {
            TestType::HighTemp => "MIL-STD-810 Method 501.7",
            TestType::LowTemp => "MIL-STD-810 Method 502.7",
            TestType::ThermalShock => "IEC 60068-2-14",
            TestType::HumidityResistance => "MIL-STD-810 Method 507.7",
            TestType::Condensation => "ISO 16750-4",
            TestType::WaterSplash => "IEC 60529",
            TestType::MechanicalVibration => "MIL-STD-810 Method 514.8",
            TestType::AcousticVibration => "MIL-STD-810 Method 515.8",
            TestType::Shock => "IEC 60068-2-27",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::HighTemp => "high_temp",
            TestType::LowTemp => "low_temp",
            TestType::ThermalShock => "thermal_shock",
            TestType::HumidityResistance => "humidity_resistance",
            TestType::Condensation => "condensation",
            TestType::WaterSplash => "water_splash",
            TestType::MechanicalVibration => "mechanical_vibration",
            TestType::AcousticVibration => "acoustic_vibration",
            TestType::Shock => "shock",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestCategory::ALL
            .iter()
            .flat_map(|c| c.test_types().iter())
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown test type '{}'", s))
    }
}

// =============================================================================
// LabeledSample
// =============================================================================

/// One synthetic test record with its ground-truth label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    /// `TEST_000001`-style identifier.
    pub test_id: String,
    pub test_category: TestCategory,
    pub test_type: TestType,
    #[serde(flatten)]
    pub parameters: TestParameters,
    /// Label-rule composite score in [0, 1].
    pub risk_score: f64,
    pub pass_fail: Verdict,
    /// Minutes.
    pub test_duration: u32,
    pub test_date: NaiveDate,
    pub standard: String,
}

impl LabeledSample {
    pub fn features(&self) -> FeatureRow {
        self.parameters.to_features()
    }

    pub fn label(&self) -> u8 {
        self.pass_fail.label()
    }
}
