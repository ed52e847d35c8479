//! RiskClassifier: scaler + estimator with train / predict / persist.
//!
//! A classifier is either untrained or holds a complete [`TrainedModel`]
//! (scaler, estimator and metrics together). Prediction, importance and
//! saving require the trained state.
//!
//! # Persistence
//!
//! The trained state is written as one JSON bundle:
//!
//! ```json
//! {
//!   "model_type": "random_forest",
//!   "feature_names": ["temperature", "humidity", "vibration", "pressure"],
//!   "scaler": { "mean": [...], "scale": [...] },
//!   "estimator": { "kind": "random_forest", "trees": [...], "importances": [...] },
//!   "metrics": { "accuracy": 0.97, ... }
//! }
//! ```
//!
//! Saving writes a sibling temporary file and renames it over the target, so
//! readers never observe a partially written bundle.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::{
    FEATURE_NAMES, FeatureRow, ModelInfo, ModelType, Prediction, TestParameters, TrainingMetrics,
    Verdict,
};

use crate::Classifier;
use crate::error::{ModelError, ModelResult};
use crate::estimator::{Estimator, ModelSpec};
use crate::metrics::{accuracy, mean_std, weighted_precision_recall_f1};
use crate::scaler::StandardScaler;
use crate::split::{StratifiedKFold, stratified_split};

/// Default held-out fraction for [`RiskClassifier::train`].
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Default seed for splits and bootstrap sampling.
pub const DEFAULT_SEED: u64 = 42;
/// Folds used for the training-time cross-validation score.
pub const CV_FOLDS: usize = 5;

// =============================================================================
// TrainedModel
// =============================================================================

/// Everything needed to predict, persisted as a single bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model_type: ModelType,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub estimator: Estimator,
    pub metrics: TrainingMetrics,
}

impl TrainedModel {
    /// Consistency check applied to loaded bundles.
    fn validate(&self) -> Result<(), String> {
        if self.feature_names != FEATURE_NAMES {
            return Err(format!(
                "feature names {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            ));
        }
        if self.estimator.model_type() != self.model_type {
            return Err(format!(
                "model_type '{}' but estimator is '{}'",
                self.model_type,
                self.estimator.model_type()
            ));
        }
        if !self.scaler.is_valid() {
            return Err("scaler has non-finite or non-positive statistics".into());
        }
        self.estimator.validate()
    }

    fn predict_row(&self, row: &FeatureRow) -> ModelResult<Prediction> {
        check_finite(row)?;
        let scaled = self.scaler.transform_row(row);
        let verdict = Verdict::from_label(self.estimator.predict(&scaled));
        Ok(Prediction::from_probabilities(
            verdict,
            self.estimator.predict_proba(&scaled),
        ))
    }
}

/// One row of [`RiskClassifier::predict_batch`] output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    #[serde(flatten)]
    pub parameters: TestParameters,
    pub prediction: Verdict,
    pub risk_score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
enum State {
    Untrained,
    Trained(Box<TrainedModel>),
}

// =============================================================================
// RiskClassifier
// =============================================================================

/// PASS/FAIL classifier over the four environmental parameters.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    spec: ModelSpec,
    seed: u64,
    state: State,
}

impl RiskClassifier {
    /// Untrained classifier with default hyperparameters for `model_type`.
    pub fn new(model_type: ModelType) -> Self {
        Self::with_spec(ModelSpec::default_for(model_type))
    }

    /// Untrained classifier from a model type tag such as `"random_forest"`.
    pub fn from_tag(tag: &str) -> ModelResult<Self> {
        Ok(Self::new(tag.parse()?))
    }

    /// Untrained classifier with explicit hyperparameters.
    pub fn with_spec(spec: ModelSpec) -> Self {
        Self {
            spec,
            seed: DEFAULT_SEED,
            state: State::Untrained,
        }
    }

    /// Trained classifier assembled from already-fitted parts.
    pub fn from_parts(
        spec: ModelSpec,
        scaler: StandardScaler,
        estimator: Estimator,
        metrics: TrainingMetrics,
    ) -> Self {
        Self {
            seed: DEFAULT_SEED,
            state: State::Trained(Box::new(TrainedModel {
                model_type: spec.model_type(),
                feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                scaler,
                estimator,
                metrics,
            })),
            spec,
        }
    }

    /// Seed for the train/test split, CV and bootstrap sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn model_type(&self) -> ModelType {
        self.spec.model_type()
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, State::Trained(_))
    }

    /// Metrics of the trained model, if any.
    pub fn metrics(&self) -> Option<&TrainingMetrics> {
        match &self.state {
            State::Trained(m) => Some(&m.metrics),
            State::Untrained => None,
        }
    }

    pub fn trained(&self) -> ModelResult<&TrainedModel> {
        match &self.state {
            State::Trained(m) => Ok(m),
            State::Untrained => Err(ModelError::NotTrained),
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_type: self.model_type(),
            is_trained: self.is_trained(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            metrics: self.metrics().copied(),
        }
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Split, scale, fit and evaluate; on success the classifier is trained.
    ///
    /// Metrics are measured on the held-out partition; `cv_mean`/`cv_std`
    /// are 5-fold stratified accuracy on the scaled training partition.
    /// On error the previous state is kept.
    pub fn train(
        &mut self,
        features: &[FeatureRow],
        labels: &[u8],
        test_fraction: f64,
    ) -> ModelResult<TrainingMetrics> {
        if features.len() != labels.len() {
            return Err(ModelError::InsufficientSamples(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        features.iter().try_for_each(check_finite)?;
        let labels: Vec<u8> = labels.iter().map(|&l| u8::from(l != 0)).collect();
        let n_fail = labels.iter().filter(|&&l| l == 1).count();
        let classes = usize::from(n_fail > 0) + usize::from(n_fail < labels.len());
        if classes < 2 {
            return Err(ModelError::DegenerateLabelSet { classes });
        }
        self.spec.validate()?;

        let (train_idx, test_idx) = stratified_split(&labels, test_fraction, self.seed)?;
        let gather = |idx: &[usize]| -> (Vec<FeatureRow>, Vec<u8>) {
            idx.iter().map(|&i| (features[i], labels[i])).unzip()
        };
        let (x_train, y_train) = gather(&train_idx);
        let (x_test, y_test) = gather(&test_idx);

        let scaler = StandardScaler::fit(&x_train)?;
        let x_train = scaler.transform(&x_train);
        let x_test = scaler.transform(&x_test);

        let estimator = self.spec.fit(&x_train, &y_train, self.seed)?;
        let y_pred: Vec<u8> = x_test.iter().map(|r| estimator.predict(r)).collect();
        let (precision, recall, f1_score) = weighted_precision_recall_f1(&y_test, &y_pred);

        let cv_scores = cross_val_accuracy(&self.spec, &x_train, &y_train, CV_FOLDS, self.seed)?;
        let (cv_mean, cv_std) = mean_std(&cv_scores);

        let metrics = TrainingMetrics {
            accuracy: accuracy(&y_test, &y_pred),
            precision,
            recall,
            f1_score,
            cv_mean,
            cv_std,
        };
        info!(
            model_type = %self.model_type(),
            n_train = x_train.len(),
            n_test = x_test.len(),
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            cv_mean,
            "Trained classifier"
        );

        self.state = State::Trained(Box::new(TrainedModel {
            model_type: self.model_type(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            scaler,
            estimator,
            metrics,
        }));
        Ok(metrics)
    }

    // =========================================================================
    // Inference
    // =========================================================================

    /// Predict one raw (unscaled) feature row.
    pub fn predict_row(&self, row: &FeatureRow) -> ModelResult<Prediction> {
        self.trained()?.predict_row(row)
    }

    pub fn predict(&self, params: &TestParameters) -> ModelResult<Prediction> {
        self.predict_row(&params.to_features())
    }

    /// Predict many rows; each output row echoes its input parameters.
    pub fn predict_batch(&self, rows: &[FeatureRow]) -> ModelResult<Vec<BatchPrediction>> {
        let model = self.trained()?;
        parallel::try_map_slice(
            rows,
            |row| {
                let p = model.predict_row(row)?;
                Ok(BatchPrediction {
                    parameters: TestParameters::from_features(row),
                    prediction: p.prediction,
                    risk_score: p.risk_score,
                    confidence: p.confidence,
                })
            },
            false,
        )
    }

    /// Feature importances, highest first.
    pub fn feature_importance(&self) -> ModelResult<Vec<(&'static str, f64)>> {
        let model = self.trained()?;
        let mut ranked: Vec<(&'static str, f64)> = FEATURE_NAMES
            .iter()
            .copied()
            .zip(model.estimator.feature_importances())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the trained bundle to `path`, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ModelResult<()> {
        let path = path.as_ref();
        let model = self.trained()?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp = temp_path(path);
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            serde_json::to_writer(&mut writer, model)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;

        debug!(path = %path.display(), model_type = %model.model_type, "Saved model");
        Ok(())
    }

    /// Replace this classifier's state with the bundle at `path`.
    ///
    /// On error the current state is kept.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> ModelResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::ModelFileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let model: TrainedModel =
            serde_json::from_str(&content).map_err(|e| ModelError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        model.validate().map_err(|reason| ModelError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })?;

        if model.model_type != self.model_type() {
            self.spec = ModelSpec::default_for(model.model_type);
        }
        info!(path = %path.display(), model_type = %model.model_type, "Loaded model");
        self.state = State::Trained(Box::new(model));
        Ok(())
    }

    /// Load a classifier from `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> ModelResult<Self> {
        let mut classifier = Self::new(ModelType::RandomForest);
        classifier.load(path)?;
        Ok(classifier)
    }
}

/// Reject rows containing NaN or infinite values.
pub fn check_finite(row: &FeatureRow) -> ModelResult<()> {
    match row.iter().position(|v| !v.is_finite()) {
        Some(j) => Err(ModelError::NonFiniteFeature {
            feature: FEATURE_NAMES[j],
            value: row[j],
        }),
        None => Ok(()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Stratified k-fold accuracy of `spec` on already-scaled rows, folds fit in
/// parallel.
pub fn cross_val_accuracy(
    spec: &ModelSpec,
    x: &[FeatureRow],
    y: &[u8],
    folds: usize,
    seed: u64,
) -> ModelResult<Vec<f64>> {
    cross_val_score(spec, x, y, folds, seed, accuracy)
}

/// Stratified k-fold score of `spec` under `score(y_true, y_pred)`.
pub fn cross_val_score<S>(
    spec: &ModelSpec,
    x: &[FeatureRow],
    y: &[u8],
    folds: usize,
    seed: u64,
    score: S,
) -> ModelResult<Vec<f64>>
where
    S: Fn(&[u8], &[u8]) -> f64 + Sync + Send,
{
    let folds = StratifiedKFold::new(folds).split(y)?;
    parallel::try_map_slice(
        &folds,
        |fold| {
            let x_train: Vec<FeatureRow> = fold.train.iter().map(|&i| x[i]).collect();
            let y_train: Vec<u8> = fold.train.iter().map(|&i| y[i]).collect();
            let estimator = spec.fit(&x_train, &y_train, seed)?;
            let y_true: Vec<u8> = fold.test.iter().map(|&i| y[i]).collect();
            let y_pred: Vec<u8> = fold.test.iter().map(|&i| estimator.predict(&x[i])).collect();
            Ok(score(&y_true, &y_pred))
        },
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_forest() -> ModelSpec {
        ModelSpec::RandomForest(crate::ForestConfig::default().with_n_estimators(10))
    }

    fn separable(n: usize) -> (Vec<FeatureRow>, Vec<u8>) {
        let x: Vec<FeatureRow> = (0..n)
            .map(|i| [i as f64, 50.0 + (i % 7) as f64, 5.0, 1013.0])
            .collect();
        let y = (0..n).map(|i| u8::from(i >= n * 3 / 4)).collect();
        (x, y)
    }

    #[test]
    fn test_untrained_state() {
        let clf = RiskClassifier::new(ModelType::LogisticRegression);
        assert!(!clf.is_trained());
        assert!(clf.metrics().is_none());
        assert!(matches!(
            clf.predict(&TestParameters::default()),
            Err(ModelError::NotTrained)
        ));
        assert!(matches!(clf.feature_importance(), Err(ModelError::NotTrained)));
        assert!(matches!(clf.save("unused.json"), Err(ModelError::NotTrained)));
        let info = clf.info();
        assert!(!info.is_trained);
        assert_eq!(info.feature_names.len(), 4);
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(
            RiskClassifier::from_tag("logistic_regression").unwrap().model_type(),
            ModelType::LogisticRegression
        );
        assert!(matches!(
            RiskClassifier::from_tag("svm"),
            Err(ModelError::InvalidModelType(_))
        ));
    }

    #[test]
    fn test_degenerate_labels() {
        let (x, _) = separable(40);
        let mut clf = RiskClassifier::with_spec(small_forest());
        let err = clf.train(&x, &[0u8; 40], 0.2).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateLabelSet { classes: 1 }));
        assert!(!clf.is_trained());
    }

    #[test]
    fn test_length_mismatch() {
        let (x, y) = separable(40);
        let mut clf = RiskClassifier::with_spec(small_forest());
        assert!(matches!(
            clf.train(&x, &y[..39], 0.2),
            Err(ModelError::InsufficientSamples(_))
        ));
    }

    #[test]
    fn test_train_and_predict() {
        let (x, y) = separable(200);
        let mut clf = RiskClassifier::with_spec(small_forest());
        let metrics = clf.train(&x, &y, 0.2).unwrap();
        assert!(clf.is_trained());
        assert!(metrics.accuracy > 0.9);
        assert!(metrics.cv_mean > 0.9);

        let low = clf.predict_row(&[10.0, 50.0, 5.0, 1013.0]).unwrap();
        assert_eq!(low.prediction, Verdict::Pass);
        let high = clf.predict_row(&[190.0, 50.0, 5.0, 1013.0]).unwrap();
        assert_eq!(high.prediction, Verdict::Fail);
        assert!((0.0..=1.0).contains(&high.risk_score));
        assert_eq!(high.risk_score, high.fail_probability);

        let ranked = clf.feature_importance().unwrap();
        assert_eq!(ranked[0].0, "temperature");
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_predict_batch_echoes_rows() {
        let (x, y) = separable(120);
        let mut clf = RiskClassifier::new(ModelType::LogisticRegression);
        clf.train(&x, &y, 0.25).unwrap();
        let out = clf.predict_batch(&x[..5]).unwrap();
        assert_eq!(out.len(), 5);
        for (row, p) in x.iter().zip(&out) {
            assert_eq!(p.parameters.to_features(), *row);
            assert_eq!(p.prediction, clf.predict_row(row).unwrap().prediction);
        }
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("models/risk.json")),
            PathBuf::from("models/risk.json.tmp")
        );
    }
}
