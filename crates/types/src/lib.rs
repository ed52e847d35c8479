//! Core types for TestScope environmental test risk scoring.
//!
//! This crate provides the value types shared by every other crate:
//! test parameters and their limits, per-factor risk fractions, labeled
//! samples, model tags, training metrics and prediction records.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod factors;
pub mod model;
pub mod params;
pub mod sample;
pub mod standards;

// =============================================================================
// Re-exports
// =============================================================================

pub use factors::RiskFactors;
pub use model::{ModelInfo, ModelType, ParseModelTypeError, Prediction, TrainingMetrics, round3};
pub use params::{
    FEATURE_NAMES, FeatureRow, N_FEATURES, Parameter, ParameterLimit, STANDARD_LIMITS,
    TestParameters, idx,
};
pub use sample::{LABEL_FAIL, LABEL_PASS, LabeledSample, TestCategory, TestType, Verdict};
pub use standards::{STANDARDS, Standard, find_standard};
