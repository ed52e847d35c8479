//! Plain-text training report.

use std::fmt;
use std::fs;
use std::path::Path;

use models::{ClassificationReport, ConfusionMatrix};
use tracing::info;
use types::{ModelType, TrainingMetrics};

/// Per-model comparison plus the winner's full-set evaluation.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub n_samples: usize,
    pub fail_count: usize,
    pub results: Vec<(ModelType, TrainingMetrics)>,
    pub best: ModelType,
    pub best_params: String,
    pub feature_importance: Vec<(&'static str, f64)>,
    pub confusion: ConfusionMatrix,
    pub classification: ClassificationReport,
}

impl TrainingReport {
    /// Write the report, creating parent directories.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_string())?;
        info!(path = %path.display(), "Saved training report");
        Ok(())
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TestScope - Model Training Report")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f)?;

        let pass = self.n_samples - self.fail_count;
        let pct = |c: usize| {
            if self.n_samples == 0 {
                0.0
            } else {
                c as f64 / self.n_samples as f64 * 100.0
            }
        };
        writeln!(f, "Samples: {}", self.n_samples)?;
        writeln!(f, "  PASS: {} ({:.1}%)", pass, pct(pass))?;
        writeln!(f, "  FAIL: {} ({:.1}%)", self.fail_count, pct(self.fail_count))?;
        writeln!(f)?;

        writeln!(f, "Model Performance Comparison:")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for (model_type, m) in &self.results {
            writeln!(f)?;
            writeln!(f, "{}:", model_type.as_str().to_uppercase())?;
            writeln!(f, "  Accuracy:  {:.3}", m.accuracy)?;
            writeln!(f, "  Precision: {:.3}", m.precision)?;
            writeln!(f, "  Recall:    {:.3}", m.recall)?;
            writeln!(f, "  F1-Score:  {:.3}", m.f1_score)?;
            writeln!(f, "  CV Mean:   {:.3}", m.cv_mean)?;
            writeln!(f, "  CV Std:    {:.3}", m.cv_std)?;
        }
        writeln!(f)?;

        writeln!(f, "Best Model: {} ({})", self.best, self.best_params)?;
        writeln!(f)?;
        writeln!(f, "Feature Importance:")?;
        for (name, importance) in &self.feature_importance {
            writeln!(f, "  {:<12} {:.4}", name, importance)?;
        }
        writeln!(f)?;

        writeln!(f, "Evaluation on the full generated set:")?;
        writeln!(f, "{}", self.confusion)?;
        writeln!(f)?;
        write!(f, "{}", self.classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(f1: f64) -> TrainingMetrics {
        TrainingMetrics {
            accuracy: 0.9,
            precision: 0.9,
            recall: 0.9,
            f1_score: f1,
            cv_mean: 0.88,
            cv_std: 0.01,
        }
    }

    fn report() -> TrainingReport {
        let y_true = [0, 0, 0, 1, 1];
        let y_pred = [0, 0, 1, 1, 1];
        TrainingReport {
            n_samples: 5,
            fail_count: 2,
            results: vec![
                (ModelType::RandomForest, metrics(0.91)),
                (ModelType::LogisticRegression, metrics(0.85)),
            ],
            best: ModelType::RandomForest,
            best_params: "n_estimators=100".into(),
            feature_importance: vec![("temperature", 0.5), ("humidity", 0.5)],
            confusion: ConfusionMatrix::from_labels(&y_true, &y_pred),
            classification: ClassificationReport::from_labels(&y_true, &y_pred),
        }
    }

    #[test]
    fn test_report_sections() {
        let text = report().to_string();
        assert!(text.starts_with("TestScope - Model Training Report"));
        assert!(text.contains("RANDOM_FOREST:"));
        assert!(text.contains("LOGISTIC_REGRESSION:"));
        assert!(text.contains("F1-Score:  0.910"));
        assert!(text.contains("FAIL: 2 (40.0%)"));
        assert!(text.contains("Best Model: random_forest"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn test_write_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("report.txt");
        report().write_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Model Performance Comparison"));
    }
}
