//! Shared risk-scoring context.
//!
//! Owns the one classifier the binary uses. It is read-only once loaded,
//! so a shared `&RiskContext` can score from several threads.

use anyhow::Context;
use models::{ModelError, RiskClassifier};
use risk::{RiskLevel, RuleAssessment, recommendations};
use serde::Serialize;
use tracing::{info, warn};
use training::ModelTrainer;
use types::{Prediction, RiskFactors, TestParameters};

use crate::config::AppConfig;

/// Rule-based and model-based view of one parameter set.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub rules: RuleAssessment,
    pub prediction: Prediction,
    /// Rule factors with the total replaced by the model's risk score.
    pub display_factors: RiskFactors,
    pub model_level: RiskLevel,
    pub recommendations: &'static [&'static str],
}

pub struct RiskContext {
    classifier: RiskClassifier,
}

impl RiskContext {
    /// Load the model at the configured path, or train and save one when
    /// no model file exists yet.
    pub fn load_or_train(config: &AppConfig) -> anyhow::Result<Self> {
        let classifier = match RiskClassifier::open(&config.model_path) {
            Ok(clf) => clf,
            Err(ModelError::ModelFileNotFound(path)) => {
                warn!(path = %path.display(), "No saved model, running training pipeline");
                Self::train_new(config)?
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("loading model from {}", config.model_path.display())
                });
            }
        };
        info!(model_type = %classifier.model_type(), "Risk context ready");
        Ok(Self { classifier })
    }

    fn train_new(config: &AppConfig) -> anyhow::Result<RiskClassifier> {
        let mut trainer = ModelTrainer::new(config.trainer_config());
        let outcome = trainer
            .full_training_pipeline(config.n_samples)
            .context("training pipeline failed")?;
        Ok(outcome.best)
    }

    pub fn predict(&self, params: &TestParameters) -> anyhow::Result<Prediction> {
        Ok(self.classifier.predict(params)?)
    }

    pub fn model_info(&self) -> types::ModelInfo {
        self.classifier.info()
    }

    pub fn feature_importance(&self) -> anyhow::Result<Vec<(&'static str, f64)>> {
        Ok(self.classifier.feature_importance()?)
    }

    /// Rule factors, validation and model prediction together.
    pub fn assess(&self, params: &TestParameters) -> anyhow::Result<Assessment> {
        let rules = risk::assess(params);
        rules.validation.log();
        let prediction = self.predict(params)?;
        Ok(Assessment {
            display_factors: rules.factors.with_total_override(prediction.risk_score),
            model_level: RiskLevel::from_score(prediction.risk_score),
            recommendations: recommendations(prediction.risk_score),
            rules,
            prediction,
        })
    }
}
