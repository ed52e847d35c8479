//! Trainable PASS/FAIL classifiers for environmental test parameters.
//!
//! This crate provides:
//! - [`RiskClassifier`]: scaler + estimator with train / predict / save / load
//! - [`RandomForest`] and [`LogisticRegression`] learners behind [`ModelSpec`]
//! - [`StandardScaler`], [`stratified_split`] and [`StratifiedKFold`]
//! - Classification metrics ([`ConfusionMatrix`], [`ClassificationReport`])
//!
//! All fitted models implement [`Classifier`] and produce binary class
//! probabilities `[P(PASS), P(FAIL)]`.
//!
//! # Usage
//!
//! ```ignore
//! use models::RiskClassifier;
//! use types::{ModelType, TestParameters};
//!
//! let mut clf = RiskClassifier::new(ModelType::RandomForest);
//! clf.train(&features, &labels, 0.2)?;
//! let p = clf.predict(&TestParameters::new(65.0, 50.0, 5.0, 1013.0))?;
//! clf.save("models/risk_classifier.json")?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod classifier;
pub mod decision_tree;
pub mod error;
pub mod estimator;
pub mod logistic;
pub mod metrics;
pub mod random_forest;
pub mod scaler;
pub mod split;

// =============================================================================
// Re-exports
// =============================================================================

pub use classifier::{
    BatchPrediction, CV_FOLDS, DEFAULT_SEED, DEFAULT_TEST_FRACTION, RiskClassifier, TrainedModel,
    check_finite, cross_val_accuracy, cross_val_score,
};
pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use error::{ModelError, ModelResult};
pub use estimator::{Estimator, ModelSpec};
pub use logistic::{LinearConfig, LogisticRegression, Penalty, Solver};
pub use metrics::{
    ClassScores, ClassificationReport, ConfusionMatrix, accuracy, mean_std,
    weighted_precision_recall_f1,
};
pub use random_forest::{ForestConfig, RandomForest};
pub use scaler::StandardScaler;
pub use split::{Fold, StratifiedKFold, stratified_split};

use types::FeatureRow;

/// Class probabilities: `[P(PASS), P(FAIL)]`.
pub type ClassProbabilities = [f64; 2];

/// A fitted binary classifier over scaled feature rows.
///
/// Implementors must be `Send + Sync` so folds and trees can be evaluated
/// in parallel.
pub trait Classifier: Send + Sync {
    /// `[P(PASS), P(FAIL)]`, summing to 1.
    fn predict_proba(&self, features: &FeatureRow) -> ClassProbabilities;

    /// Native class decision: 0 = PASS, 1 = FAIL.
    fn predict(&self, features: &FeatureRow) -> u8;

    /// Non-negative per-feature importances in feature order.
    fn feature_importances(&self) -> FeatureRow;
}

/// Sample weights `n / (k * n_c)` where `k` is the number of classes present.
///
/// Any non-zero label counts as FAIL.
pub fn balanced_weights(y: &[u8]) -> Vec<f64> {
    let n = y.len() as f64;
    let n_fail = y.iter().filter(|&&l| l != 0).count();
    let counts = [y.len() - n_fail, n_fail];
    let k = counts.iter().filter(|&&c| c > 0).count().max(1) as f64;
    y.iter()
        .map(|&l| n / (k * counts[usize::from(l != 0)] as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_weights() {
        let w = balanced_weights(&[0, 0, 0, 1]);
        // 4 / (2 * 3) and 4 / (2 * 1)
        assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(w[3], 2.0);
        let total: f64 = w.iter().sum();
        assert!((total - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_weights_single_class() {
        assert_eq!(balanced_weights(&[1, 1, 1]), vec![1.0, 1.0, 1.0]);
        assert!(balanced_weights(&[]).is_empty());
    }
}
