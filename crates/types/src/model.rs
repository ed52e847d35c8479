//! Model tags, training metrics and prediction records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sample::Verdict;

// =============================================================================
// ModelType
// =============================================================================

/// Supported learning algorithms, in selection tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    RandomForest,
    LogisticRegression,
}

impl ModelType {
    /// Declaration order; earlier types win F1 ties.
    pub const ALL: [ModelType; 2] = [ModelType::RandomForest, ModelType::LogisticRegression];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::RandomForest => "random_forest",
            ModelType::LogisticRegression => "logistic_regression",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized model type tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported model type '{0}' (expected random_forest or logistic_regression)")]
pub struct ParseModelTypeError(pub String);

impl FromStr for ModelType {
    type Err = ParseModelTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseModelTypeError(s.to_string()))
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Held-out evaluation plus cross-validation summary of a trained model.
///
/// Precision, recall and F1 are support-weighted averages over both classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
}

impl fmt::Display for TrainingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy={:.3} precision={:.3} recall={:.3} f1={:.3} cv={:.3} (+/- {:.3})",
            self.accuracy,
            self.precision,
            self.recall,
            self.f1_score,
            self.cv_mean,
            self.cv_std * 2.0
        )
    }
}

// =============================================================================
// Prediction
// =============================================================================

/// Round to 3 decimals, the precision predictions are reported at.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Classifier output for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The estimator's own class decision.
    pub prediction: Verdict,
    /// P(FAIL), the authoritative risk number.
    pub risk_score: f64,
    /// max(P(PASS), P(FAIL)).
    pub confidence: f64,
    pub pass_probability: f64,
    pub fail_probability: f64,
}

impl Prediction {
    /// Build from raw class probabilities `[P(PASS), P(FAIL)]`.
    pub fn from_probabilities(prediction: Verdict, probs: [f64; 2]) -> Self {
        Self {
            prediction,
            risk_score: round3(probs[1]),
            confidence: round3(probs[0].max(probs[1])),
            pass_probability: round3(probs[0]),
            fail_probability: round3(probs[1]),
        }
    }
}

/// Summary of a classifier for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: ModelType,
    pub is_trained: bool,
    pub feature_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrainingMetrics>,
}
