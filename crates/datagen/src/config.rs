//! Configuration for synthetic data generation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Composite label score at or above which a sample is labeled FAIL.
pub const FAIL_THRESHOLD: f64 = 0.7;

// =============================================================================
// GeneratorConfig
// =============================================================================

/// Controls the sampling and labeling of synthetic test records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Standard deviation of the zero-mean Gaussian noise added to the label
    /// score. Zero disables noise.
    pub noise_std: f64,

    /// Composite score at or above which a sample is FAIL.
    pub fail_threshold: f64,

    /// Date test dates are counted back from. `None` uses today.
    pub reference_date: Option<NaiveDate>,

    /// Oldest test date, in days before the reference date.
    pub history_days: u32,

    /// Test duration range in minutes, `[min, max)`.
    pub duration_minutes: (u32, u32),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            noise_std: 0.03,
            fail_threshold: FAIL_THRESHOLD,
            reference_date: None,
            history_days: 365,
            duration_minutes: (30, 480),
        }
    }
}

impl GeneratorConfig {
    /// Noise-free labeling: every label follows the deterministic base score.
    pub fn noiseless() -> Self {
        Self::default().with_noise_std(0.0)
    }

    /// Set label noise; negative or non-finite values disable noise.
    pub fn with_noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = if noise_std.is_finite() {
            noise_std.max(0.0)
        } else {
            0.0
        };
        self
    }

    pub fn with_fail_threshold(mut self, threshold: f64) -> Self {
        self.fail_threshold = threshold;
        self
    }

    /// Pin the reference date so generated dates are reproducible.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days.max(1);
        self
    }

    /// Set the duration range; `max` is raised to `min + 1` if needed.
    pub fn with_duration_minutes(mut self, min: u32, max: u32) -> Self {
        let min = min.min(u32::MAX - 1);
        self.duration_minutes = (min, max.max(min + 1));
        self
    }

    /// Re-apply the builder rules to fields that may have been set directly.
    pub fn sanitized(self) -> Self {
        let (min, max) = self.duration_minutes;
        let history_days = self.history_days;
        let noise_std = self.noise_std;
        self.with_noise_std(noise_std)
            .with_history_days(history_days)
            .with_duration_minutes(min, max)
    }
}
