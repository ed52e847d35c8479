//! Central configuration for the `testscope` binary.
//!
//! Filled from CLI arguments, which fall back to `TESTSCOPE_*` environment
//! variables and then to the defaults below.

use std::path::PathBuf;

use datagen::GeneratorConfig;
use models::DEFAULT_SEED;
use training::{DEFAULT_MODEL_PATH, DEFAULT_REPORT_PATH, DEFAULT_SAMPLES, TrainerConfig};

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Model store
    // ─────────────────────────────────────────────────────────────────────────
    /// Persisted classifier bundle.
    pub model_path: PathBuf,
    /// Training report written by the pipeline; `None` skips it.
    pub report_path: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────────────────
    // Training
    // ─────────────────────────────────────────────────────────────────────────
    /// Samples generated for training and export.
    pub n_samples: usize,
    /// Seed for generation and training.
    pub seed: u64,
    /// Label noise for generated data.
    pub noise_std: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            report_path: Some(PathBuf::from(DEFAULT_REPORT_PATH)),
            n_samples: DEFAULT_SAMPLES,
            seed: DEFAULT_SEED,
            noise_std: GeneratorConfig::default().noise_std,
        }
    }
}

impl AppConfig {
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    pub fn samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived configs
    // ─────────────────────────────────────────────────────────────────────────

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::default().with_noise_std(self.noise_std)
    }

    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig::default()
            .with_n_samples(self.n_samples)
            .with_seed(self.seed)
            .with_generator(self.generator_config())
            .with_model_path(self.model_path.clone())
            .with_report_path(self.report_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainer_config_inherits_settings() {
        let config = AppConfig::default()
            .model_path("/tmp/m.json")
            .samples(123)
            .seed(9)
            .noise_std(0.0)
            .report_path(None);
        let trainer = config.trainer_config();
        assert_eq!(trainer.model_path, PathBuf::from("/tmp/m.json"));
        assert_eq!(trainer.n_samples, 123);
        assert_eq!(trainer.seed, 9);
        assert_eq!(trainer.generator.noise_std, 0.0);
        assert!(trainer.report_path.is_none());
    }
}
