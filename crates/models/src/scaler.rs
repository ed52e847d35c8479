//! Per-feature standardization.

use serde::{Deserialize, Serialize};
use types::{FeatureRow, N_FEATURES};

use crate::error::{ModelError, ModelResult};

/// Standard scaler: `(x - mean) / scale` per feature.
///
/// `scale` is the population standard deviation; zero-variance features get
/// a scale of 1 so they map to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: FeatureRow,
    pub scale: FeatureRow,
}

impl StandardScaler {
    /// Fit on `rows`. Fails on empty input.
    pub fn fit(rows: &[FeatureRow]) -> ModelResult<Self> {
        if rows.is_empty() {
            return Err(ModelError::InsufficientSamples(
                "cannot fit scaler on zero rows".into(),
            ));
        }
        let n = rows.len() as f64;

        let mut mean = [0.0; N_FEATURES];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut scale = [0.0; N_FEATURES];
        for row in rows {
            for j in 0..N_FEATURES {
                scale[j] += (row[j] - mean[j]).powi(2);
            }
        }
        for s in scale.iter_mut() {
            let std = (*s / n).sqrt();
            *s = if std > f64::EPSILON { std } else { 1.0 };
        }

        Ok(Self { mean, scale })
    }

    #[inline]
    pub fn transform_row(&self, row: &FeatureRow) -> FeatureRow {
        std::array::from_fn(|j| (row[j] - self.mean[j]) / self.scale[j])
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    /// Whether every statistic is finite and every scale positive.
    pub fn is_valid(&self) -> bool {
        self.mean.iter().all(|m| m.is_finite())
            && self.scale.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}
