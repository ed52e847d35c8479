//! Dataset summary statistics.

use std::collections::BTreeMap;

use serde::Serialize;
use types::{LabeledSample, TestCategory, Verdict};

/// Location and spread of the label-rule risk scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Test duration summary in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationStats {
    pub mean: f64,
    pub median: f64,
    pub total_hours: f64,
}

/// Distribution and trend summary of a set of samples.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub category_distribution: BTreeMap<TestCategory, usize>,
    pub pass_count: usize,
    pub fail_count: usize,
    /// Percentage of PASS samples.
    pub pass_rate: f64,
    pub risk: Option<ScoreStats>,
    pub duration: Option<DurationStats>,
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Summarize `samples`; empty input yields [`DatasetSummary::default`].
pub fn summarize(samples: &[LabeledSample]) -> DatasetSummary {
    if samples.is_empty() {
        return DatasetSummary::default();
    }
    let total = samples.len();

    let mut category_distribution = BTreeMap::new();
    for s in samples {
        *category_distribution.entry(s.test_category).or_insert(0) += 1;
    }

    let pass_count = samples
        .iter()
        .filter(|s| s.pass_fail == Verdict::Pass)
        .count();

    let mut scores: Vec<f64> = samples.iter().map(|s| s.risk_score).collect();
    scores.sort_by(f64::total_cmp);
    let score_mean = mean(&scores);
    let variance = scores
        .iter()
        .map(|s| (s - score_mean).powi(2))
        .sum::<f64>()
        / total as f64;

    let mut durations: Vec<f64> = samples.iter().map(|s| f64::from(s.test_duration)).collect();
    durations.sort_by(f64::total_cmp);

    DatasetSummary {
        total,
        category_distribution,
        pass_count,
        fail_count: total - pass_count,
        pass_rate: pass_count as f64 / total as f64 * 100.0,
        risk: Some(ScoreStats {
            mean: score_mean,
            median: median(&scores),
            std: variance.sqrt(),
            min: scores[0],
            max: scores[total - 1],
        }),
        duration: Some(DurationStats {
            mean: mean(&durations),
            median: median(&durations),
            total_hours: durations.iter().sum::<f64>() / 60.0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use types::{TestParameters, TestType};

    fn sample(category: TestType, score: f64, verdict: Verdict, minutes: u32) -> LabeledSample {
        LabeledSample {
            test_id: "TEST_000001".into(),
            test_category: category.category(),
            test_type: category,
            parameters: TestParameters::default(),
            risk_score: score,
            pass_fail: verdict,
            test_duration: minutes,
            test_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            standard: category.standard().into(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.risk.is_none());
        assert!(summary.category_distribution.is_empty());
    }

    #[test]
    fn test_summary_values() {
        let samples = vec![
            sample(TestType::HighTemp, 0.2, Verdict::Pass, 60),
            sample(TestType::Shock, 0.8, Verdict::Fail, 120),
            sample(TestType::LowTemp, 0.4, Verdict::Pass, 90),
            sample(TestType::Condensation, 0.6, Verdict::Pass, 30),
        ];
        let summary = summarize(&samples);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.pass_count, 3);
        assert_eq!(summary.fail_count, 1);
        assert_eq!(summary.pass_rate, 75.0);
        assert_eq!(summary.category_distribution[&TestCategory::Temperature], 2);
        assert_eq!(summary.category_distribution[&TestCategory::Humidity], 1);

        let risk = summary.risk.unwrap();
        assert!((risk.mean - 0.5).abs() < 1e-12);
        assert!((risk.median - 0.5).abs() < 1e-12);
        assert!((risk.std - 0.05f64.sqrt()).abs() < 1e-12);
        assert_eq!(risk.min, 0.2);
        assert_eq!(risk.max, 0.8);

        let duration = summary.duration.unwrap();
        assert_eq!(duration.mean, 75.0);
        assert_eq!(duration.median, 75.0);
        assert_eq!(duration.total_hours, 5.0);
    }
}
