//! Closed dispatch over the supported learning algorithms.
//!
//! [`ModelSpec`] is an unfitted algorithm with its hyperparameters;
//! [`Estimator`] is the fitted counterpart. Both have one arm per
//! [`ModelType`].

use serde::{Deserialize, Serialize};
use types::{FeatureRow, ModelType};

use crate::error::ModelResult;
use crate::logistic::{LinearConfig, LogisticRegression};
use crate::random_forest::{ForestConfig, RandomForest};
use crate::{ClassProbabilities, Classifier};

/// Learning algorithm plus hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(ForestConfig),
    LogisticRegression(LinearConfig),
}

impl ModelSpec {
    /// Default hyperparameters for `model_type`.
    pub fn default_for(model_type: ModelType) -> Self {
        match model_type {
            ModelType::RandomForest => ModelSpec::RandomForest(ForestConfig::default()),
            ModelType::LogisticRegression => {
                ModelSpec::LogisticRegression(LinearConfig::default())
            }
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            ModelSpec::RandomForest(_) => ModelType::RandomForest,
            ModelSpec::LogisticRegression(_) => ModelType::LogisticRegression,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        match self {
            ModelSpec::RandomForest(config) => config.validate(),
            ModelSpec::LogisticRegression(config) => config.validate(),
        }
    }

    /// Fit on already-scaled rows. `seed` drives any randomness.
    pub fn fit(&self, x: &[FeatureRow], y: &[u8], seed: u64) -> ModelResult<Estimator> {
        Ok(match self {
            ModelSpec::RandomForest(config) => {
                Estimator::RandomForest(RandomForest::fit(x, y, config, seed)?)
            }
            ModelSpec::LogisticRegression(config) => {
                Estimator::LogisticRegression(LogisticRegression::fit(x, y, config)?)
            }
        })
    }

    /// Short hyperparameter description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            ModelSpec::RandomForest(c) => format!(
                "n_estimators={} max_depth={} min_samples_split={} min_samples_leaf={}",
                c.n_estimators,
                c.max_depth.map_or("none".to_string(), |d| d.to_string()),
                c.min_samples_split,
                c.min_samples_leaf
            ),
            ModelSpec::LogisticRegression(c) => {
                format!("C={} penalty={} solver={}", c.c, c.penalty, c.solver)
            }
        }
    }
}

/// Fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl Estimator {
    pub fn model_type(&self) -> ModelType {
        match self {
            Estimator::RandomForest(_) => ModelType::RandomForest,
            Estimator::LogisticRegression(_) => ModelType::LogisticRegression,
        }
    }

    /// Structural check used after deserializing.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Estimator::RandomForest(m) => m.validate(),
            Estimator::LogisticRegression(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Estimator::RandomForest(m) => m,
            Estimator::LogisticRegression(m) => m,
        }
    }
}

impl Classifier for Estimator {
    fn predict_proba(&self, features: &FeatureRow) -> ClassProbabilities {
        self.inner().predict_proba(features)
    }

    fn predict(&self, features: &FeatureRow) -> u8 {
        self.inner().predict(features)
    }

    fn feature_importances(&self) -> FeatureRow {
        self.inner().feature_importances()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_specs() {
        for t in ModelType::ALL {
            let spec = ModelSpec::default_for(t);
            assert_eq!(spec.model_type(), t);
            assert!(spec.validate().is_ok());
        }
        match ModelSpec::default_for(ModelType::RandomForest) {
            ModelSpec::RandomForest(c) => {
                assert_eq!(c.n_estimators, 100);
                assert_eq!(c.max_depth, Some(10));
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn test_fit_dispatch() {
        let x: Vec<FeatureRow> = (0..40).map(|i| [i as f64 / 10.0 - 2.0, 0.0, 0.0, 0.0]).collect();
        let y: Vec<u8> = (0..40).map(|i| u8::from(i >= 20)).collect();
        for t in ModelType::ALL {
            let estimator = ModelSpec::default_for(t).fit(&x, &y, 0).unwrap();
            assert_eq!(estimator.model_type(), t);
            assert_eq!(estimator.predict(&[-1.5, 0.0, 0.0, 0.0]), 0);
            assert_eq!(estimator.predict(&[1.5, 0.0, 0.0, 0.0]), 1);
        }
    }

    #[test]
    fn test_describe() {
        let spec = ModelSpec::default_for(ModelType::LogisticRegression);
        assert_eq!(spec.describe(), "C=1 penalty=l2 solver=newton");
    }
}
