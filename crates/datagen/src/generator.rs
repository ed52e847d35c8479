//! Synthetic labeled sample generator.
//!
//! # Usage
//!
//! ```ignore
//! let mut generator = SyntheticDataGenerator::new(GeneratorConfig::default(), 42);
//! let samples = generator.generate(2000);
//! let (features, labels) = generator.generate_training(5000);
//! ```

use chrono::{Local, NaiveDate, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use types::{FeatureRow, LabeledSample, Parameter, TestCategory, TestParameters, Verdict};

use crate::config::GeneratorConfig;
use crate::labeling::label_score;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// SyntheticDataGenerator
// =============================================================================

/// Produces labeled test records by uniform sampling within the standard
/// limits.
///
/// Deterministic given the same seed and reference date. Each call to
/// [`generate`](Self::generate) continues the RNG stream, so consecutive
/// calls return different data.
pub struct SyntheticDataGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    seed: u64,
}

impl SyntheticDataGenerator {
    /// Create a generator with an explicit seed.
    ///
    /// Out-of-range config fields are repaired with [`GeneratorConfig::sanitized`].
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config: config.sanitized(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a generator with a random seed (see [`seed`](Self::seed)).
    pub fn from_entropy(config: GeneratorConfig) -> Self {
        Self::new(config, rand::random())
    }

    /// Seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate exactly `n` labeled samples, ids `TEST_000001..`.
    pub fn generate(&mut self, n: usize) -> Vec<LabeledSample> {
        let reference = self
            .config
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());

        let samples: Vec<LabeledSample> = (1..=n).map(|i| self.sample(i, reference)).collect();

        let fails = samples
            .iter()
            .filter(|s| s.pass_fail == Verdict::Fail)
            .count();
        debug!(
            n,
            fails,
            passes = n - fails,
            seed = self.seed,
            "Generated synthetic samples"
        );
        samples
    }

    /// Generate `n` samples as a feature matrix and binary labels
    /// (1 = FAIL).
    pub fn generate_training(&mut self, n: usize) -> (Vec<FeatureRow>, Vec<u8>) {
        self.generate(n)
            .iter()
            .map(|s| (s.features(), s.label()))
            .unzip()
    }

    fn sample(&mut self, index: usize, reference: NaiveDate) -> LabeledSample {
        let mut row = [0.0; 4];
        for parameter in Parameter::ALL {
            let limit = parameter.limit();
            row[parameter.index()] = round_to(self.rng.random_range(limit.min..limit.max), 2);
        }
        let parameters = TestParameters::from_features(&row);

        let category = TestCategory::ALL[self.rng.random_range(0..TestCategory::ALL.len())];
        let choices = category.test_types();
        let test_type = choices[self.rng.random_range(0..choices.len())];

        // Labeled from the rounded values so exported rows reproduce their label.
        let score = label_score(&parameters, self.config.noise_std, &mut self.rng);
        let pass_fail = if score >= self.config.fail_threshold {
            Verdict::Fail
        } else {
            Verdict::Pass
        };

        let (min_minutes, max_minutes) = self.config.duration_minutes;
        let test_duration = self.rng.random_range(min_minutes..max_minutes);
        let days_back = self.rng.random_range(1..=self.config.history_days);
        let test_date = reference - TimeDelta::days(i64::from(days_back));

        LabeledSample {
            test_id: format!("TEST_{:06}", index),
            test_category: category,
            test_type,
            parameters,
            risk_score: round_to(score, 3),
            pass_fail,
            test_duration,
            test_date,
            standard: test_type.standard().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::base_label_score;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn setup_generator(noise: f64, seed: u64) -> SyntheticDataGenerator {
        let config = GeneratorConfig::default()
            .with_noise_std(noise)
            .with_reference_date(reference());
        SyntheticDataGenerator::new(config, seed)
    }

    #[test]
    fn test_generates_exactly_n() {
        let mut generator = setup_generator(0.03, 1);
        assert_eq!(generator.generate(0).len(), 0);
        assert_eq!(generator.generate(1).len(), 1);
        assert_eq!(generator.generate(257).len(), 257);
    }

    #[test]
    fn test_deterministic_generation() {
        let a = setup_generator(0.03, 42).generate(200);
        let b = setup_generator(0.03, 42).generate(200);
        assert_eq!(a, b);

        let c = setup_generator(0.03, 43).generate(200);
        assert_ne!(a, c);
    }

    #[test]
    fn test_calls_continue_the_stream() {
        let mut generator = setup_generator(0.03, 9);
        let first = generator.generate(50);
        let second = generator.generate(50);
        assert_eq!(first[0].test_id, "TEST_000001");
        assert_eq!(second[0].test_id, "TEST_000001");
        assert_ne!(first, second);
    }

    #[test]
    fn test_fields_within_ranges() {
        let samples = setup_generator(0.03, 5).generate(1000);
        for s in &samples {
            for parameter in Parameter::ALL {
                assert!(parameter.limit().contains(s.parameters.get(parameter)));
            }
            assert!((0.0..=1.0).contains(&s.risk_score));
            assert!((30..480).contains(&s.test_duration));
            let age = (reference() - s.test_date).num_days();
            assert!((1..=365).contains(&age), "age {age}");
            assert_eq!(s.test_type.category(), s.test_category);
            assert_eq!(s.standard, s.test_type.standard());
        }
        assert_eq!(samples[41].test_id, "TEST_000042");
    }

    #[test]
    fn test_inverted_duration_range_is_repaired() {
        let mut config = GeneratorConfig::default().with_reference_date(reference());
        config.duration_minutes = (60, 10);
        config.history_days = 0;
        let samples = SyntheticDataGenerator::new(config, 3).generate(50);
        for s in &samples {
            assert_eq!(s.test_duration, 60);
            assert_eq!((reference() - s.test_date).num_days(), 1);
        }
    }

    #[test]
    fn test_noiseless_labels_follow_base_score() {
        let samples = setup_generator(0.0, 11).generate(2000);
        for s in &samples {
            let fail = base_label_score(&s.parameters) >= 0.7;
            assert_eq!(s.pass_fail == Verdict::Fail, fail, "{}", s.test_id);
        }
    }

    #[test]
    fn test_both_classes_present() {
        let (x, y) = setup_generator(0.03, 3).generate_training(1000);
        assert_eq!(x.len(), 1000);
        let fails = y.iter().filter(|&&l| l == 1).count();
        assert!(fails > 0 && fails < 1000, "fails = {fails}");
    }

    #[test]
    fn test_from_entropy_records_seed() {
        let generator = SyntheticDataGenerator::from_entropy(GeneratorConfig::default());
        let seed = generator.seed();
        let mut a = SyntheticDataGenerator::new(
            generator.config().clone().with_reference_date(reference()),
            seed,
        );
        let mut b = SyntheticDataGenerator::new(
            GeneratorConfig::default().with_reference_date(reference()),
            seed,
        );
        assert_eq!(a.generate(10), b.generate(10));
    }
}
