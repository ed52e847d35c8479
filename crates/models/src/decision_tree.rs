//! Weighted CART decision tree for binary classification.
//!
//! # Layout
//!
//! Nodes are stored flat in pre-order. A node with `feature == -1` is a
//! leaf and carries `[p_pass, p_fail]` in `value`; internal nodes carry a
//! feature index, a threshold and child indices.
//!
//! # Tree Traversal
//!
//! - Start at node 0 (root)
//! - If `feature == -1`, return `value` as probabilities
//! - Else compare `features[node.feature]` to `node.threshold`
//!   - If `<= threshold` or `NaN`, go to `left`
//!   - Else go to `right`
//!
//! # Fitting
//!
//! Splits minimize weighted Gini impurity. Each node scans `max_features`
//! non-constant features drawn without replacement; thresholds are midpoints between
//! consecutive distinct values. Feature importance accumulates the weighted
//! impurity decrease of every split.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use types::{FeatureRow, N_FEATURES};

use crate::{ClassProbabilities, Classifier};

/// A single node in the decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index to split on (-1 for leaf nodes).
    pub feature: i32,
    /// Threshold value for the split.
    pub threshold: f64,
    /// Index of left child (-1 for leaf nodes).
    pub left: i32,
    /// Index of right child (-1 for leaf nodes).
    pub right: i32,
    /// Class probabilities for leaf nodes (None for internal nodes).
    pub value: Option<Vec<f64>>,
}

impl TreeNode {
    fn leaf(probs: ClassProbabilities) -> Self {
        Self {
            feature: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            value: Some(probs.to_vec()),
        }
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features drawn per split.
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: N_FEATURES,
        }
    }
}

/// Fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree nodes in pre-order traversal.
    pub nodes: Vec<TreeNode>,
    /// Unnormalized weighted impurity decrease per feature.
    pub impurity_decrease: FeatureRow,
}

#[inline]
fn gini(w_pass: f64, w_fail: f64) -> f64 {
    let total = w_pass + w_fail;
    if total <= 0.0 {
        return 0.0;
    }
    let p = w_fail / total;
    2.0 * p * (1.0 - p)
}

struct Split {
    feature: usize,
    threshold: f64,
    /// Weighted impurity decrease (parent minus children, weight-scaled).
    gain: f64,
}

struct Builder<'a, R: Rng> {
    x: &'a [FeatureRow],
    y: &'a [u8],
    weights: &'a [f64],
    config: TreeConfig,
    rng: &'a mut R,
    nodes: Vec<TreeNode>,
    impurity_decrease: FeatureRow,
}

impl<R: Rng> Builder<'_, R> {
    fn class_weights(&self, indices: &[usize]) -> (f64, f64) {
        indices.iter().fold((0.0, 0.0), |(p, f), &i| {
            if self.y[i] == 0 {
                (p + self.weights[i], f)
            } else {
                (p, f + self.weights[i])
            }
        })
    }

    fn build(&mut self, indices: &[usize], depth: usize) -> i32 {
        let node_idx = self.nodes.len();
        let (w_pass, w_fail) = self.class_weights(indices);
        let total = w_pass + w_fail;
        let probs = if total > 0.0 {
            [w_pass / total, w_fail / total]
        } else {
            [1.0, 0.0]
        };
        self.nodes.push(TreeNode::leaf(probs));

        let impurity = gini(w_pass, w_fail);
        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || impurity <= 0.0
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
        {
            return node_idx as i32;
        }

        let Some(split) = self.best_split(indices, total * impurity) else {
            return node_idx as i32;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][split.feature] <= split.threshold);

        self.impurity_decrease[split.feature] += split.gain.max(0.0);
        let left = self.build(&left_idx, depth + 1);
        let right = self.build(&right_idx, depth + 1);

        self.nodes[node_idx] = TreeNode {
            feature: split.feature as i32,
            threshold: split.threshold,
            left,
            right,
            value: None,
        };
        node_idx as i32
    }

    fn best_split(&mut self, indices: &[usize], parent_cost: f64) -> Option<Split> {
        let mut candidates: [usize; N_FEATURES] = std::array::from_fn(|j| j);
        candidates.shuffle(&mut *self.rng);
        let k = self.config.max_features.clamp(1, N_FEATURES);

        let (w_pass, w_fail) = self.class_weights(indices);
        let min_leaf = self.config.min_samples_leaf.max(1);
        let n = indices.len();

        let mut best: Option<Split> = None;
        let mut sorted = indices.to_vec();

        // Constant features do not count toward `k`; keep drawing until `k`
        // splittable features have been scanned.
        let mut visited = 0;
        for &feature in &candidates {
            if visited >= k {
                break;
            }
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));
            if self.x[sorted[0]][feature] >= self.x[sorted[n - 1]][feature] {
                continue;
            }
            visited += 1;

            let (mut left_pass, mut left_fail) = (0.0, 0.0);
            for pos in 0..n - 1 {
                let i = sorted[pos];
                if self.y[i] == 0 {
                    left_pass += self.weights[i];
                } else {
                    left_fail += self.weights[i];
                }

                let here = self.x[i][feature];
                let next = self.x[sorted[pos + 1]][feature];
                if here >= next {
                    continue;
                }
                let n_left = pos + 1;
                if n_left < min_leaf || n - n_left < min_leaf {
                    continue;
                }

                let right_pass = w_pass - left_pass;
                let right_fail = w_fail - left_fail;
                let cost = (left_pass + left_fail) * gini(left_pass, left_fail)
                    + (right_pass + right_fail) * gini(right_pass, right_fail);
                let gain = parent_cost - cost;

                if best.as_ref().is_none_or(|b| gain > b.gain) {
                    let mid = here + (next - here) / 2.0;
                    let threshold = if mid < next { mid } else { here };
                    best = Some(Split {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        // Zero-gain splits allowed: XOR-like interactions separate one level down.
        best.filter(|s| s.gain >= -1e-12)
    }
}

impl DecisionTree {
    /// Fit on the rows named by `indices`.
    ///
    /// `indices` may repeat rows (bootstrap draws); each occurrence counts
    /// with its row's weight. `weights` is indexed by row, like `x` and `y`.
    pub fn fit<R: Rng>(
        x: &[FeatureRow],
        y: &[u8],
        weights: &[f64],
        indices: &[usize],
        config: TreeConfig,
        rng: &mut R,
    ) -> Self {
        let mut builder = Builder {
            x,
            y,
            weights,
            config,
            rng,
            nodes: Vec::new(),
            impurity_decrease: [0.0; N_FEATURES],
        };
        builder.build(indices, 0);
        Self {
            nodes: builder.nodes,
            impurity_decrease: builder.impurity_decrease,
        }
    }

    /// Traverse the tree and return the leaf node index.
    #[inline]
    fn traverse(&self, features: &FeatureRow) -> usize {
        let mut node_idx = 0usize;
        loop {
            let node = &self.nodes[node_idx];
            if node.feature == -1 {
                return node_idx;
            }
            let feature_val = features
                .get(node.feature as usize)
                .copied()
                .unwrap_or(f64::NAN);
            if feature_val.is_nan() || feature_val <= node.threshold {
                node_idx = node.left as usize;
            } else {
                node_idx = node.right as usize;
            }
        }
    }

    /// Maximum root-to-leaf depth (root alone is depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            let node = &nodes[idx];
            if node.feature == -1 {
                0
            } else {
                1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Check child links, feature indices and leaf probabilities.
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        let n = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.feature == -1 {
                match &node.value {
                    Some(v) if v.len() == 2 && v.iter().all(|p| p.is_finite()) => {}
                    Some(v) => {
                        return Err(format!("leaf {} has {} probabilities, expected 2", i, v.len()));
                    }
                    None => return Err(format!("leaf {} missing value array", i)),
                }
            } else {
                if node.feature < 0 || node.feature as usize >= N_FEATURES {
                    return Err(format!("node {} has invalid feature {}", i, node.feature));
                }
                // Pre-order: children always follow their parent.
                let child_ok = |c: i32| c > i as i32 && c < n;
                if !child_ok(node.left) || !child_ok(node.right) {
                    return Err(format!(
                        "node {} has invalid children {} / {}",
                        i, node.left, node.right
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn predict_proba(&self, features: &FeatureRow) -> ClassProbabilities {
        match &self.nodes[self.traverse(features)].value {
            Some(probs) if probs.len() >= 2 => [probs[0], probs[1]],
            _ => [1.0, 0.0],
        }
    }

    fn predict(&self, features: &FeatureRow) -> u8 {
        let [p_pass, p_fail] = self.predict_proba(features);
        u8::from(p_fail > p_pass)
    }

    fn feature_importances(&self) -> FeatureRow {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total > 0.0 {
            self.impurity_decrease.map(|v| v / total)
        } else {
            [0.0; N_FEATURES]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fit_all(x: &[FeatureRow], y: &[u8], config: TreeConfig) -> DecisionTree {
        let weights = vec![1.0; x.len()];
        let indices: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(0);
        DecisionTree::fit(x, y, &weights, &indices, config, &mut rng)
    }

    fn hand_built() -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode {
                    feature: 0,
                    threshold: 50.0,
                    left: 1,
                    right: 2,
                    value: None,
                },
                TreeNode::leaf([0.8, 0.2]),
                TreeNode::leaf([0.1, 0.9]),
            ],
            impurity_decrease: [1.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_traverse_left_and_right() {
        let tree = hand_built();
        assert_eq!(tree.predict_proba(&[30.0, 0.0, 0.0, 0.0]), [0.8, 0.2]);
        assert_eq!(tree.predict_proba(&[50.0, 0.0, 0.0, 0.0]), [0.8, 0.2]);
        assert_eq!(tree.predict_proba(&[60.0, 0.0, 0.0, 0.0]), [0.1, 0.9]);
        assert_eq!(tree.predict(&[60.0, 0.0, 0.0, 0.0]), 1);
    }

    #[test]
    fn test_nan_goes_left() {
        let tree = hand_built();
        assert_eq!(tree.predict_proba(&[f64::NAN, 0.0, 0.0, 0.0]), [0.8, 0.2]);
    }

    #[test]
    fn test_fits_threshold_on_separable_data() {
        let x: Vec<FeatureRow> = (0..20).map(|i| [i as f64, 0.0, 0.0, 0.0]).collect();
        let y: Vec<u8> = (0..20).map(|i| u8::from(i >= 12)).collect();
        let tree = fit_all(&x, &y, TreeConfig::default());

        assert_eq!(tree.nodes[0].feature, 0);
        assert_eq!(tree.nodes[0].threshold, 11.5);
        assert_eq!(tree.depth(), 1);
        for (row, &label) in x.iter().zip(&y) {
            assert_eq!(tree.predict(row), label);
        }
        assert_eq!(tree.feature_importances(), [1.0, 0.0, 0.0, 0.0]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_pure_input_is_single_leaf() {
        let x = vec![[1.0, 2.0, 3.0, 4.0]; 5];
        let y = vec![0u8; 5];
        let tree = fit_all(&x, &y, TreeConfig::default());
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.predict_proba(&x[0]), [1.0, 0.0]);
        assert_eq!(tree.feature_importances(), [0.0; 4]);
    }

    #[test]
    fn test_max_depth_respected() {
        // XOR-like pattern needs depth 2; cap at 1.
        let x: Vec<FeatureRow> = vec![
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [1.0, 1.0, 0.0, 0.0],
        ]
        .into_iter()
        .cycle()
        .take(40)
        .collect();
        let y: Vec<u8> = x.iter().map(|r| u8::from((r[0] > 0.5) != (r[1] > 0.5))).collect();

        let shallow = fit_all(
            &x,
            &y,
            TreeConfig {
                max_depth: Some(1),
                ..TreeConfig::default()
            },
        );
        assert!(shallow.depth() <= 1);

        let deep = fit_all(&x, &y, TreeConfig::default());
        for (row, &label) in x.iter().zip(&y) {
            assert_eq!(deep.predict(row), label);
        }
    }

    #[test]
    fn test_min_samples_leaf() {
        let x: Vec<FeatureRow> = (0..10).map(|i| [i as f64, 0.0, 0.0, 0.0]).collect();
        let y: Vec<u8> = (0..10).map(|i| u8::from(i == 9)).collect();
        let tree = fit_all(
            &x,
            &y,
            TreeConfig {
                min_samples_leaf: 3,
                ..TreeConfig::default()
            },
        );
        // The lone FAIL cannot be isolated into a leaf of one.
        assert!(tree.predict_proba(&x[9])[1] < 1.0);
    }

    #[test]
    fn test_weights_shift_leaf_probabilities() {
        let x = vec![[0.0; 4]; 4];
        let y = vec![0, 0, 0, 1];
        let weights = vec![1.0, 1.0, 1.0, 3.0];
        let indices = vec![0, 1, 2, 3];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, &weights, &indices, TreeConfig::default(), &mut rng);
        assert_eq!(tree.predict_proba(&x[0]), [0.5, 0.5]);
        // Ties go to PASS.
        assert_eq!(tree.predict(&x[0]), 0);
    }

    #[test]
    fn test_validate_rejects_bad_links() {
        let mut tree = hand_built();
        tree.nodes[0].right = 7;
        assert!(tree.validate().is_err());
    }
}
