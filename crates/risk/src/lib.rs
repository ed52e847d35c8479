//! RiskRuleEngine: deterministic risk scoring for environmental test
//! parameters.
//!
//! - [`factors`]: the step-function display rule and its equal-weighted total
//! - [`validate`]: soft bounds checks against the standard-wide limits
//! - [`advice`]: risk levels and planning recommendations
//! - [`scenarios`]: preset parameter sets per standard
//!
//! Everything here is pure. Nothing is cached; callers recompute per query.

pub mod advice;
pub mod factors;
pub mod scenarios;
pub mod validate;

pub use advice::{RiskLevel, recommendations};
pub use factors::{
    compute_risk_factors, humidity_risk, pressure_risk, risk_factors, temperature_risk,
    vibration_risk,
};
pub use scenarios::{Scenario, scenarios};
pub use validate::{Bound, BoundsWarning, ValidationReport, validate};

use serde::Serialize;
use types::{RiskFactors, TestParameters};

/// Rule-based view of one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleAssessment {
    pub parameters: TestParameters,
    pub factors: RiskFactors,
    pub level: RiskLevel,
    pub validation: ValidationReport,
}

/// Score, band and validate a parameter set in one call.
pub fn assess(params: &TestParameters) -> RuleAssessment {
    let factors = risk_factors(params);
    RuleAssessment {
        parameters: *params,
        factors,
        level: RiskLevel::from_score(factors.total_risk),
        validation: validate(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assess_combined_preset() {
        let a = assess(&TestParameters::new(60.0, 85.0, 25.0, 1013.0));
        assert_eq!(a.level, RiskLevel::High);
        assert!(a.validation.warnings.is_empty());
    }

    #[test]
    fn test_assess_out_of_range_still_scores() {
        let a = assess(&TestParameters::new(75.0, 50.0, 5.0, 1013.0));
        assert_eq!(a.validation.warnings.len(), 1);
        assert_eq!(a.factors.temperature_risk, 0.95);
    }
}
