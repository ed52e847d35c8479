//! Configuration for the training pipeline.

use std::path::PathBuf;

use datagen::GeneratorConfig;
use models::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, ForestConfig, LinearConfig, ModelSpec};
use types::ModelType;

/// Default location of the persisted winning model.
pub const DEFAULT_MODEL_PATH: &str = "models/risk_classifier.json";
/// Default location of the text training report.
pub const DEFAULT_REPORT_PATH: &str = "reports/training_report.txt";
/// Default number of synthetic samples to train on.
pub const DEFAULT_SAMPLES: usize = 5000;

/// Settings for [`ModelTrainer`](crate::ModelTrainer).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────────────────
    /// Samples generated when no explicit count is given.
    pub n_samples: usize,
    /// Seed for generation, splitting, CV and bootstrap sampling.
    pub seed: u64,
    /// Held-out fraction for per-model metrics.
    pub test_fraction: f64,
    pub generator: GeneratorConfig,

    // ─────────────────────────────────────────────────────────────────────────
    // Candidates
    // ─────────────────────────────────────────────────────────────────────────
    /// Hyperparameters for the random forest candidate.
    pub forest: ForestConfig,
    /// Hyperparameters for the logistic regression candidate.
    pub linear: LinearConfig,

    // ─────────────────────────────────────────────────────────────────────────
    // Outputs
    // ─────────────────────────────────────────────────────────────────────────
    /// Where the winning model is saved.
    pub model_path: PathBuf,
    /// Where the text report is written; `None` skips the report.
    pub report_path: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_samples: DEFAULT_SAMPLES,
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            generator: GeneratorConfig::default(),
            forest: ForestConfig::default(),
            linear: LinearConfig::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            report_path: Some(PathBuf::from(DEFAULT_REPORT_PATH)),
        }
    }
}

impl TrainerConfig {
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    pub fn with_linear(mut self, linear: LinearConfig) -> Self {
        self.linear = linear;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    /// Candidate hyperparameters for `model_type`.
    pub fn spec_for(&self, model_type: ModelType) -> ModelSpec {
        match model_type {
            ModelType::RandomForest => ModelSpec::RandomForest(self.forest),
            ModelType::LogisticRegression => ModelSpec::LogisticRegression(self.linear),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.n_samples, 5000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.model_path, PathBuf::from("models/risk_classifier.json"));
        for t in ModelType::ALL {
            assert_eq!(config.spec_for(t), ModelSpec::default_for(t));
        }
    }

    #[test]
    fn test_builders() {
        let config = TrainerConfig::default()
            .with_seed(7)
            .with_forest(ForestConfig::default().with_n_estimators(5))
            .with_report_path(None);
        assert_eq!(config.seed, 7);
        assert!(config.report_path.is_none());
        match config.spec_for(ModelType::RandomForest) {
            ModelSpec::RandomForest(f) => assert_eq!(f.n_estimators, 5),
            other => panic!("unexpected spec {other:?}"),
        }
    }
}
