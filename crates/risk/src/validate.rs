//! Soft bounds validation against the standard-wide parameter limits.
//!
//! Out-of-range values produce warnings only. Scoring still runs on them;
//! callers decide whether to surface the warnings. NaN and infinite values
//! are always flagged, since no range comparison catches NaN.

use std::fmt;

use serde::Serialize;
use tracing::warn;
use types::{Parameter, TestParameters};

/// Which side of the limit a value fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    BelowMinimum,
    AboveMaximum,
    NotFinite,
}

/// A single parameter outside its limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundsWarning {
    pub parameter: Parameter,
    pub value: f64,
    pub bound: Bound,
    /// The violated limit value; `None` for [`Bound::NotFinite`].
    pub limit: Option<f64>,
}

impl fmt::Display for BoundsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.parameter.limit().unit;
        let (direction, which, limit) = match (self.bound, self.limit) {
            (Bound::BelowMinimum, Some(limit)) => ("low", "minimum", limit),
            (Bound::AboveMaximum, Some(limit)) => ("high", "maximum", limit),
            _ => return write!(f, "{} is not a finite number: {}", self.parameter, self.value),
        };
        write!(
            f,
            "{} too {}: {}{} ({}: {}{})",
            self.parameter, direction, self.value, unit, which, limit, unit
        )
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Always true: bounds violations are warnings, not errors.
    pub is_valid: bool,
    pub warnings: Vec<BoundsWarning>,
}

impl ValidationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Human-readable warning lines.
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Emit each warning at `warn` level.
    pub fn log(&self) {
        for w in &self.warnings {
            warn!(parameter = %w.parameter, value = w.value, limit = ?w.limit, "{}", w);
        }
    }
}

/// Check each parameter against its standard-wide limit.
pub fn validate(params: &TestParameters) -> ValidationReport {
    let warnings = Parameter::ALL
        .into_iter()
        .filter_map(|parameter| {
            let limit = parameter.limit();
            let value = params.get(parameter);
            let (bound, limit) = if !value.is_finite() {
                (Bound::NotFinite, None)
            } else if value < limit.min {
                (Bound::BelowMinimum, Some(limit.min))
            } else if value > limit.max {
                (Bound::AboveMaximum, Some(limit.max))
            } else {
                return None;
            };
            Some(BoundsWarning {
                parameter,
                value,
                bound,
                limit,
            })
        })
        .collect();

    ValidationReport {
        is_valid: true,
        warnings,
    }
}
