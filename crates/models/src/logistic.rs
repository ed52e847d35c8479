//! Binary logistic regression.
//!
//! Minimizes the sample-weighted mean log-loss plus a penalty on the
//! coefficients (the intercept is never penalized):
//!
//! ```text
//! f(w, b) = (1/W) Σ wᵢ ℓ(xᵢ·w + b, yᵢ) + λ · penalty(w),   λ = 1 / (C · W)
//! ```
//!
//! With W the total sample weight this has the same minimizer as the
//! `C Σ wᵢ ℓᵢ + penalty` form, so `C` keeps its usual meaning: larger values
//! regularize less.
//!
//! Two solvers:
//! - **Newton**: damped Newton steps with backtracking line search (L2 only)
//! - **Proximal**: proximal gradient with step `1/L` (L1 or L2)
//!
//! Inference is `sigmoid(w·x + b)`; the class decision is `w·x + b > 0`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::{FeatureRow, N_FEATURES};

use crate::error::{ModelError, ModelResult};
use crate::{ClassProbabilities, Classifier, balanced_weights};

/// Parameters: coefficients followed by the intercept.
const N_PARAMS: usize = N_FEATURES + 1;

// =============================================================================
// LinearConfig
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    L1,
    L2,
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Penalty::L1 => "l1",
            Penalty::L2 => "l2",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    Newton,
    Proximal,
}

impl Solver {
    pub fn supports(&self, penalty: Penalty) -> bool {
        match self {
            Solver::Newton => penalty == Penalty::L2,
            Solver::Proximal => true,
        }
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Solver::Newton => "newton",
            Solver::Proximal => "proximal",
        })
    }
}

/// Hyperparameters for [`LogisticRegression`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    /// Inverse regularization strength.
    pub c: f64,
    pub penalty: Penalty,
    pub solver: Solver,
    pub max_iter: usize,
    /// Gradient (Newton) or step (proximal) tolerance.
    pub tol: f64,
    /// Reweight samples inversely to class frequency.
    pub class_balanced: bool,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            penalty: Penalty::L2,
            solver: Solver::Newton,
            max_iter: 1000,
            tol: 1e-6,
            class_balanced: true,
        }
    }
}

impl LinearConfig {
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ModelError::InvalidHyperparameters(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if !self.solver.supports(self.penalty) {
            return Err(ModelError::InvalidHyperparameters(format!(
                "solver '{}' does not support penalty '{}'",
                self.solver, self.penalty
            )));
        }
        if self.max_iter == 0 {
            return Err(ModelError::InvalidHyperparameters(
                "max_iter must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Objective
// =============================================================================

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
#[inline]
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

#[inline]
fn linear(theta: &[f64; N_PARAMS], row: &FeatureRow) -> f64 {
    row.iter()
        .zip(theta)
        .map(|(x, w)| x * w)
        .sum::<f64>()
        + theta[N_FEATURES]
}

struct Problem<'a> {
    x: &'a [FeatureRow],
    y: &'a [u8],
    w: Vec<f64>,
    total_weight: f64,
    lambda: f64,
}

impl Problem<'_> {
    /// Weighted mean log-loss.
    fn loss(&self, theta: &[f64; N_PARAMS]) -> f64 {
        let sum: f64 = self
            .x
            .iter()
            .zip(self.y)
            .zip(&self.w)
            .map(|((row, &label), &wi)| {
                let z = linear(theta, row);
                wi * (softplus(z) - f64::from(label) * z)
            })
            .sum();
        sum / self.total_weight
    }

    fn l2_objective(&self, theta: &[f64; N_PARAMS]) -> f64 {
        let reg: f64 = theta[..N_FEATURES].iter().map(|c| c * c).sum();
        self.loss(theta) + 0.5 * self.lambda * reg
    }

    /// Gradient of the mean log-loss alone.
    fn loss_gradient(&self, theta: &[f64; N_PARAMS]) -> [f64; N_PARAMS] {
        let mut g = [0.0; N_PARAMS];
        for ((row, &label), &wi) in self.x.iter().zip(self.y).zip(&self.w) {
            let r = wi * (sigmoid(linear(theta, row)) - f64::from(label));
            for j in 0..N_FEATURES {
                g[j] += r * row[j];
            }
            g[N_FEATURES] += r;
        }
        g.map(|v| v / self.total_weight)
    }

    fn l2_gradient_hessian(
        &self,
        theta: &[f64; N_PARAMS],
    ) -> ([f64; N_PARAMS], [[f64; N_PARAMS]; N_PARAMS]) {
        let mut g = self.loss_gradient(theta);
        let mut h = [[0.0; N_PARAMS]; N_PARAMS];
        for (row, &wi) in self.x.iter().zip(&self.w) {
            let p = sigmoid(linear(theta, row));
            let s = wi * p * (1.0 - p) / self.total_weight;
            let ext: [f64; N_PARAMS] = std::array::from_fn(|j| if j < N_FEATURES { row[j] } else { 1.0 });
            for a in 0..N_PARAMS {
                for b in a..N_PARAMS {
                    h[a][b] += s * ext[a] * ext[b];
                }
            }
        }
        for a in 0..N_PARAMS {
            for b in 0..a {
                h[a][b] = h[b][a];
            }
        }
        for j in 0..N_FEATURES {
            g[j] += self.lambda * theta[j];
            h[j][j] += self.lambda;
        }
        (g, h)
    }

    /// Lipschitz bound of the smooth part's gradient.
    fn lipschitz(&self, include_l2: bool) -> f64 {
        let data: f64 = self
            .x
            .iter()
            .zip(&self.w)
            .map(|(row, &wi)| wi * (row.iter().map(|v| v * v).sum::<f64>() + 1.0))
            .sum();
        let l = 0.25 * data / self.total_weight;
        if include_l2 { l + self.lambda } else { l }
    }
}

/// Solve `h · d = g` by Gaussian elimination with partial pivoting.
fn solve(mut h: [[f64; N_PARAMS]; N_PARAMS], mut g: [f64; N_PARAMS]) -> Option<[f64; N_PARAMS]> {
    for col in 0..N_PARAMS {
        let pivot = (col..N_PARAMS).max_by(|&a, &b| h[a][col].abs().total_cmp(&h[b][col].abs()))?;
        if h[pivot][col].abs() < 1e-14 {
            return None;
        }
        h.swap(col, pivot);
        g.swap(col, pivot);
        for row in col + 1..N_PARAMS {
            let factor = h[row][col] / h[col][col];
            for k in col..N_PARAMS {
                h[row][k] -= factor * h[col][k];
            }
            g[row] -= factor * g[col];
        }
    }
    let mut d = [0.0; N_PARAMS];
    for row in (0..N_PARAMS).rev() {
        let tail: f64 = (row + 1..N_PARAMS).map(|k| h[row][k] * d[k]).sum();
        d[row] = (g[row] - tail) / h[row][row];
    }
    Some(d)
}

fn newton(problem: &Problem<'_>, config: &LinearConfig) -> ([f64; N_PARAMS], usize, bool) {
    let mut theta = [0.0; N_PARAMS];
    let mut f = problem.l2_objective(&theta);

    for iter in 0..config.max_iter {
        let (g, mut h) = problem.l2_gradient_hessian(&theta);
        if g.iter().all(|v| v.abs() < config.tol) {
            return (theta, iter, true);
        }
        let step = match solve(h, g) {
            Some(d) => d,
            None => {
                for (j, row) in h.iter_mut().enumerate() {
                    row[j] += 1e-8;
                }
                match solve(h, g) {
                    Some(d) => d,
                    None => return (theta, iter, false),
                }
            }
        };

        // Armijo backtracking on θ - α·d.
        let slope: f64 = g.iter().zip(&step).map(|(a, b)| a * b).sum();
        let mut alpha = 1.0;
        let mut accepted = false;
        for _ in 0..50 {
            let candidate: [f64; N_PARAMS] = std::array::from_fn(|j| theta[j] - alpha * step[j]);
            let fc = problem.l2_objective(&candidate);
            if fc <= f - 1e-4 * alpha * slope {
                theta = candidate;
                f = fc;
                accepted = true;
                break;
            }
            alpha *= 0.5;
        }
        if !accepted {
            return (theta, iter + 1, false);
        }
    }
    (theta, config.max_iter, false)
}

fn proximal(problem: &Problem<'_>, config: &LinearConfig) -> ([f64; N_PARAMS], usize, bool) {
    let l1 = config.penalty == Penalty::L1;
    let step = 1.0 / problem.lipschitz(!l1);
    let shrink = problem.lambda * step;
    let mut theta = [0.0; N_PARAMS];

    for iter in 0..config.max_iter {
        let mut g = problem.loss_gradient(&theta);
        if !l1 {
            for j in 0..N_FEATURES {
                g[j] += problem.lambda * theta[j];
            }
        }
        let mut next: [f64; N_PARAMS] = std::array::from_fn(|j| theta[j] - step * g[j]);
        if l1 {
            for v in next[..N_FEATURES].iter_mut() {
                *v = v.signum() * (v.abs() - shrink).max(0.0);
            }
        }
        let delta = next
            .iter()
            .zip(&theta)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        theta = next;
        if delta < config.tol {
            return (theta, iter + 1, true);
        }
    }
    (theta, config.max_iter, false)
}

// =============================================================================
// LogisticRegression
// =============================================================================

/// Fitted binary logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: FeatureRow,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn fit(x: &[FeatureRow], y: &[u8], config: &LinearConfig) -> ModelResult<Self> {
        config.validate()?;
        if x.is_empty() || x.len() != y.len() {
            return Err(ModelError::InsufficientSamples(format!(
                "{} rows, {} labels",
                x.len(),
                y.len()
            )));
        }

        let w = if config.class_balanced {
            balanced_weights(y)
        } else {
            vec![1.0; y.len()]
        };
        let total_weight: f64 = w.iter().sum();
        let labels: Vec<u8> = y.iter().map(|&l| u8::from(l != 0)).collect();
        let problem = Problem {
            x,
            y: &labels,
            w,
            total_weight,
            lambda: 1.0 / (config.c * total_weight),
        };

        let (theta, iterations, converged) = match config.solver {
            Solver::Newton => newton(&problem, config),
            Solver::Proximal => proximal(&problem, config),
        };
        if converged {
            debug!(solver = %config.solver, iterations, "Logistic regression converged");
        } else {
            warn!(
                solver = %config.solver,
                iterations,
                "Logistic regression stopped before converging"
            );
        }

        Ok(Self {
            coefficients: std::array::from_fn(|j| theta[j]),
            intercept: theta[N_FEATURES],
        })
    }

    /// Signed distance to the decision boundary, `w·x + b`.
    #[inline]
    pub fn decision_function(&self, features: &FeatureRow) -> f64 {
        features
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.iter().all(|c| c.is_finite()) && self.intercept.is_finite() {
            Ok(())
        } else {
            Err("non-finite coefficients".into())
        }
    }
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, features: &FeatureRow) -> ClassProbabilities {
        let p_fail = sigmoid(self.decision_function(features));
        [1.0 - p_fail, p_fail]
    }

    fn predict(&self, features: &FeatureRow) -> u8 {
        u8::from(self.decision_function(features) > 0.0)
    }

    fn feature_importances(&self) -> FeatureRow {
        self.coefficients.map(f64::abs)
    }
}
