//! Exhaustive hyperparameter search.
//!
//! Features are standardized once over the whole input, then every grid
//! candidate is scored by 5-fold stratified cross-validation on weighted F1.
//! Candidates run in parallel; the best (first on ties, in grid order) is
//! refit on all rows and wrapped in a trained [`RiskClassifier`].

use models::{
    CV_FOLDS, Classifier, ForestConfig, LinearConfig, ModelError, ModelSpec, Penalty,
    RiskClassifier, Solver, StandardScaler, accuracy, cross_val_score, mean_std,
    weighted_precision_recall_f1,
};
use tracing::{debug, info};
use types::{FeatureRow, ModelType, TrainingMetrics};

use crate::error::{TrainingError, TrainingResult};

// =============================================================================
// ParamGrid
// =============================================================================

/// Values to search per hyperparameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamGrid {
    Forest {
        n_estimators: Vec<usize>,
        max_depth: Vec<Option<usize>>,
        min_samples_split: Vec<usize>,
        min_samples_leaf: Vec<usize>,
    },
    Linear {
        c: Vec<f64>,
        penalty: Vec<Penalty>,
        solver: Vec<Solver>,
    },
}

impl ParamGrid {
    /// The standard grid for `model_type`.
    pub fn default_for(model_type: ModelType) -> Self {
        match model_type {
            ModelType::RandomForest => ParamGrid::Forest {
                n_estimators: vec![50, 100, 200],
                max_depth: vec![Some(5), Some(10), Some(15), None],
                min_samples_split: vec![2, 5, 10],
                min_samples_leaf: vec![1, 2, 4],
            },
            ModelType::LogisticRegression => ParamGrid::Linear {
                c: vec![0.1, 1.0, 10.0, 100.0],
                penalty: vec![Penalty::L1, Penalty::L2],
                solver: vec![Solver::Newton, Solver::Proximal],
            },
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            ParamGrid::Forest { .. } => ModelType::RandomForest,
            ParamGrid::Linear { .. } => ModelType::LogisticRegression,
        }
    }

    /// Every combination in row-major order, skipping penalty/solver pairs
    /// the solver cannot fit.
    pub fn candidates(&self) -> Vec<ModelSpec> {
        let mut out = Vec::new();
        match self {
            ParamGrid::Forest {
                n_estimators,
                max_depth,
                min_samples_split,
                min_samples_leaf,
            } => {
                for &n in n_estimators {
                    for &depth in max_depth {
                        for &split in min_samples_split {
                            for &leaf in min_samples_leaf {
                                out.push(ModelSpec::RandomForest(
                                    ForestConfig::default()
                                        .with_n_estimators(n)
                                        .with_max_depth(depth)
                                        .with_min_samples_split(split)
                                        .with_min_samples_leaf(leaf),
                                ));
                            }
                        }
                    }
                }
            }
            ParamGrid::Linear { c, penalty, solver } => {
                for &c in c {
                    for &p in penalty {
                        for &s in solver {
                            if s.supports(p) {
                                out.push(ModelSpec::LogisticRegression(
                                    LinearConfig::default()
                                        .with_c(c)
                                        .with_penalty(p)
                                        .with_solver(s),
                                ));
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

// =============================================================================
// Search
// =============================================================================

/// Cross-validated weighted F1 of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub spec: ModelSpec,
    pub mean: f64,
    pub std: f64,
}

/// Result of a grid search.
#[derive(Debug)]
pub struct TuningOutcome {
    /// Best candidate refit on all rows, with the globally fitted scaler.
    pub classifier: RiskClassifier,
    pub best_spec: ModelSpec,
    /// Mean CV weighted F1 of the best candidate.
    pub best_score: f64,
    /// Every candidate in grid order.
    pub scores: Vec<CandidateScore>,
}

fn weighted_f1(y_true: &[u8], y_pred: &[u8]) -> f64 {
    weighted_precision_recall_f1(y_true, y_pred).2
}

/// Search the standard grid for `model_type`.
pub fn hyperparameter_tuning(
    x: &[FeatureRow],
    y: &[u8],
    model_type: ModelType,
    seed: u64,
) -> TrainingResult<TuningOutcome> {
    tune_with_grid(x, y, &ParamGrid::default_for(model_type), seed)
}

/// Search an explicit grid.
///
/// The returned classifier's metrics are in-sample scores of the refit
/// model, with `cv_mean`/`cv_std` taken from the winning candidate.
pub fn tune_with_grid(
    x: &[FeatureRow],
    y: &[u8],
    grid: &ParamGrid,
    seed: u64,
) -> TrainingResult<TuningOutcome> {
    let model_type = grid.model_type();
    if x.len() != y.len() {
        return Err(ModelError::InsufficientSamples(format!(
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        ))
        .into());
    }
    x.iter().try_for_each(models::check_finite)?;
    let n_fail = y.iter().filter(|&&l| l != 0).count();
    let classes = usize::from(n_fail > 0) + usize::from(n_fail < y.len());
    if classes < 2 {
        return Err(ModelError::DegenerateLabelSet { classes }.into());
    }

    let candidates = grid.candidates();
    if candidates.is_empty() {
        return Err(TrainingError::EmptyGrid(model_type));
    }
    info!(%model_type, candidates = candidates.len(), "Starting grid search");

    let scaler = StandardScaler::fit(x)?;
    let x_scaled = scaler.transform(x);

    let scores: Vec<CandidateScore> = parallel::try_map_slice(
        &candidates,
        |spec| {
            let folds = cross_val_score(spec, &x_scaled, y, CV_FOLDS, seed, weighted_f1)?;
            let (mean, std) = mean_std(&folds);
            debug!(params = %spec.describe(), mean, std, "Scored candidate");
            Ok::<_, ModelError>(CandidateScore {
                spec: *spec,
                mean,
                std,
            })
        },
        false,
    )?;

    let mut best = 0;
    for (i, s) in scores.iter().enumerate() {
        if s.mean > scores[best].mean {
            best = i;
        }
    }
    let winner = scores[best];
    info!(
        params = %winner.spec.describe(),
        f1 = winner.mean,
        "Best parameters"
    );

    let estimator = winner.spec.fit(&x_scaled, y, seed)?;
    let y_pred: Vec<u8> = parallel::map_slice(&x_scaled, |r| estimator.predict(r), false);
    let (precision, recall, f1_score) = weighted_precision_recall_f1(y, &y_pred);
    let metrics = TrainingMetrics {
        accuracy: accuracy(y, &y_pred),
        precision,
        recall,
        f1_score,
        cv_mean: winner.mean,
        cv_std: winner.std,
    };

    let classifier =
        RiskClassifier::from_parts(winner.spec, scaler, estimator, metrics).with_seed(seed);
    Ok(TuningOutcome {
        classifier,
        best_spec: winner.spec,
        best_score: winner.mean,
        scores,
    })
}
