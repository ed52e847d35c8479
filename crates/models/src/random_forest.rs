//! Random forest classifier.
//!
//! # Fitting
//!
//! Each tree is grown on a bootstrap sample drawn with its own RNG, seeded
//! from the forest seed plus the tree index, so trees can be fit in parallel
//! and still match a sequential run.
//!
//! # Prediction
//!
//! 1. Traverse each tree to get leaf probabilities
//! 2. Average probabilities across all trees
//! 3. FAIL when the averaged P(FAIL) exceeds P(PASS)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{FeatureRow, N_FEATURES};

use crate::decision_tree::{DecisionTree, TreeConfig};
use crate::error::{ModelError, ModelResult};
use crate::{ClassProbabilities, Classifier, balanced_weights};

// =============================================================================
// ForestConfig
// =============================================================================

/// Hyperparameters for [`RandomForest`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features per split; `None` uses √n_features.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    /// Reweight samples inversely to class frequency.
    pub class_balanced: bool,
    /// Fit trees on the calling thread.
    pub force_sequential: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(10),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            class_balanced: true,
            force_sequential: false,
        }
    }
}

impl ForestConfig {
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_force_sequential(mut self, force: bool) -> Self {
        self.force_sequential = force;
        self
    }

    fn tree_config(&self) -> TreeConfig {
        let sqrt = (N_FEATURES as f64).sqrt().floor() as usize;
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.unwrap_or(sqrt).clamp(1, N_FEATURES),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidHyperparameters(
                "n_estimators must be at least 1".into(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidHyperparameters(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidHyperparameters(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidHyperparameters(
                "max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// RandomForest
// =============================================================================

/// Fitted random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// All trees in the ensemble.
    pub trees: Vec<DecisionTree>,
    /// Mean of per-tree normalized importances, renormalized to sum to 1.
    pub importances: FeatureRow,
}

impl RandomForest {
    /// Fit `config.n_estimators` trees on `(x, y)`.
    pub fn fit(x: &[FeatureRow], y: &[u8], config: &ForestConfig, seed: u64) -> ModelResult<Self> {
        config.validate()?;
        if x.is_empty() || x.len() != y.len() {
            return Err(ModelError::InsufficientSamples(format!(
                "{} rows, {} labels",
                x.len(),
                y.len()
            )));
        }

        let weights = if config.class_balanced {
            balanced_weights(y)
        } else {
            vec![1.0; y.len()]
        };
        let tree_config = config.tree_config();
        let n = x.len();

        let trees = parallel::map_indices(
            config.n_estimators,
            |t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, y, &weights, &indices, tree_config, &mut rng)
            },
            config.force_sequential,
        );

        let mut importances = [0.0; N_FEATURES];
        for tree in &trees {
            for (acc, v) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        debug!(
            n_trees = trees.len(),
            n_samples = n,
            max_depth = ?config.max_depth,
            "Fitted random forest"
        );
        Ok(Self { trees, importances })
    }

    /// Number of trees in the ensemble.
    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("random forest has no trees".into());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, t)| t.validate().map_err(|e| format!("tree {}: {}", i, e)))
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, features: &FeatureRow) -> ClassProbabilities {
        if self.trees.is_empty() {
            return [1.0, 0.0];
        }
        let sum = self.trees.iter().fold([0.0, 0.0], |mut acc, tree| {
            let probs = tree.predict_proba(features);
            acc[0] += probs[0];
            acc[1] += probs[1];
            acc
        });
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }

    /// Argmax of the averaged probabilities; ties go to PASS.
    fn predict(&self, features: &FeatureRow) -> u8 {
        let [p_pass, p_fail] = self.predict_proba(features);
        u8::from(p_fail > p_pass)
    }

    fn feature_importances(&self) -> FeatureRow {
        self.importances
    }
}
