//! Model selection pipeline.
//!
//! # Pipeline
//!
//! 1. Generate labeled samples
//! 2. Train one classifier per [`ModelType`] on the same split seed
//! 3. Keep the one with the best held-out F1 (earlier type wins ties)
//! 4. Evaluate the winner on the full generated set
//! 5. Write the text report (if configured)
//! 6. Save the winner to the model path
//!
//! Any failing step aborts the run; nothing is retried.

use datagen::SyntheticDataGenerator;
use models::{ClassificationReport, ConfusionMatrix, RiskClassifier};
use tracing::info;
use types::{FeatureRow, ModelType, TrainingMetrics, Verdict};

use crate::config::TrainerConfig;
use crate::error::{TrainingError, TrainingResult};
use crate::report::TrainingReport;
use crate::tuning::{TuningOutcome, hyperparameter_tuning};

/// Winner's predictions over a labeled set.
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    /// P(FAIL) per row, in input order.
    pub risk_scores: Vec<f64>,
}

/// Everything produced by [`ModelTrainer::full_training_pipeline`].
#[derive(Debug)]
pub struct TrainingOutcome {
    pub best: RiskClassifier,
    /// Held-out metrics per candidate, in [`ModelType::ALL`] order.
    pub results: Vec<(ModelType, TrainingMetrics)>,
    pub evaluation: ModelEvaluation,
    pub report: TrainingReport,
}

/// Index of the highest F1; the first of equal scores wins.
pub fn select_best(results: &[(ModelType, TrainingMetrics)]) -> TrainingResult<usize> {
    let mut best: Option<usize> = None;
    for (i, (_, metrics)) in results.iter().enumerate() {
        match best {
            Some(b) if metrics.f1_score <= results[b].1.f1_score => {}
            _ => best = Some(i),
        }
    }
    best.ok_or(TrainingError::NoCandidates)
}

/// Generates data, trains every model type and keeps the best.
pub struct ModelTrainer {
    config: TrainerConfig,
    generator: SyntheticDataGenerator,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        let generator = SyntheticDataGenerator::new(config.generator.clone(), config.seed);
        Self { config, generator }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Generate `n` rows and log the class balance.
    pub fn generate_training_data(&mut self, n: usize) -> (Vec<FeatureRow>, Vec<u8>) {
        let (x, y) = self.generator.generate_training(n);
        let fails = y.iter().filter(|&&l| l != 0).count();
        let pct = |c: usize| if n == 0 { 0.0 } else { c as f64 / n as f64 * 100.0 };
        info!(
            n,
            pass = n - fails,
            fail = fails,
            "Generated training data: PASS {:.1}%, FAIL {:.1}%",
            pct(n - fails),
            pct(fails)
        );
        (x, y)
    }

    /// Train one classifier per model type; returns all metrics and the
    /// winner.
    pub fn train_multiple_models(
        &self,
        x: &[FeatureRow],
        y: &[u8],
    ) -> TrainingResult<(Vec<(ModelType, TrainingMetrics)>, RiskClassifier)> {
        let mut trained = Vec::with_capacity(ModelType::ALL.len());
        for model_type in ModelType::ALL {
            info!(%model_type, "Training candidate");
            let mut clf = RiskClassifier::with_spec(self.config.spec_for(model_type))
                .with_seed(self.config.seed);
            let metrics = clf.train(x, y, self.config.test_fraction)?;
            trained.push((clf, metrics));
        }

        let results: Vec<(ModelType, TrainingMetrics)> = trained
            .iter()
            .map(|(clf, m)| (clf.model_type(), *m))
            .collect();
        let winner = select_best(&results)?;
        let (best, metrics) = trained.swap_remove(winner);
        info!(
            model_type = %best.model_type(),
            f1 = metrics.f1_score,
            "Selected best model"
        );
        Ok((results, best))
    }

    /// Batch-predict `x` with `model` and score against `y`.
    pub fn evaluate_model(
        model: &RiskClassifier,
        x: &[FeatureRow],
        y: &[u8],
    ) -> TrainingResult<ModelEvaluation> {
        let predictions = model.predict_batch(x)?;
        let y_pred: Vec<u8> = predictions
            .iter()
            .map(|p| u8::from(p.prediction == Verdict::Fail))
            .collect();
        let confusion = ConfusionMatrix::from_labels(y, &y_pred);
        Ok(ModelEvaluation {
            confusion,
            report: ClassificationReport::from_confusion(&confusion),
            risk_scores: predictions.iter().map(|p| p.risk_score).collect(),
        })
    }

    /// Run the whole pipeline on `n` fresh samples.
    pub fn full_training_pipeline(&mut self, n: usize) -> TrainingResult<TrainingOutcome> {
        if n == 0 {
            return Err(TrainingError::NoSamples(n));
        }
        info!(n, seed = self.config.seed, "Starting training pipeline");

        let (x, y) = self.generate_training_data(n);
        let (results, best) = self.train_multiple_models(&x, &y)?;
        let evaluation = Self::evaluate_model(&best, &x, &y)?;

        let report = TrainingReport {
            n_samples: n,
            fail_count: y.iter().filter(|&&l| l != 0).count(),
            results: results.clone(),
            best: best.model_type(),
            best_params: best.spec().describe(),
            feature_importance: best.feature_importance()?,
            confusion: evaluation.confusion,
            classification: evaluation.report,
        };
        if let Some(path) = &self.config.report_path {
            report.write_to(path)?;
        }

        best.save(&self.config.model_path)?;
        info!(
            model_type = %best.model_type(),
            path = %self.config.model_path.display(),
            accuracy = evaluation.confusion.accuracy(),
            "Training pipeline complete"
        );

        Ok(TrainingOutcome {
            best,
            results,
            evaluation,
            report,
        })
    }

    /// Grid search for `model_type` on `n` fresh samples.
    ///
    /// The tuned model is returned, not saved.
    pub fn tune(&mut self, n: usize, model_type: ModelType) -> TrainingResult<TuningOutcome> {
        if n == 0 {
            return Err(TrainingError::NoSamples(n));
        }
        let (x, y) = self.generate_training_data(n);
        hyperparameter_tuning(&x, &y, model_type, self.config.seed)
    }
}
