//! Classification metrics for binary PASS/FAIL labels.
//!
//! Weighted averages weight each class by its support. A class with no
//! predictions scores precision 0 (and F1 0) rather than NaN.

use std::fmt;

use serde::{Deserialize, Serialize};
use types::Verdict;

/// Fraction of matching labels. Empty input scores 0.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(a, b)| (**a != 0) == (**b != 0))
        .count();
    correct as f64 / y_true.len() as f64
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

// =============================================================================
// ConfusionMatrix
// =============================================================================

/// Binary confusion matrix with FAIL as the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_pass: usize,
    pub false_fail: usize,
    pub false_pass: usize,
    pub true_fail: usize,
}

/// Per-class scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

impl ConfusionMatrix {
    /// Tally `y_true` against `y_pred`; any non-zero label is FAIL.
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut m = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t != 0, p != 0) {
                (false, false) => m.true_pass += 1,
                (false, true) => m.false_fail += 1,
                (true, false) => m.false_pass += 1,
                (true, true) => m.true_fail += 1,
            }
        }
        m
    }

    pub fn total(&self) -> usize {
        self.true_pass + self.false_fail + self.false_pass + self.true_fail
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_pass + self.true_fail, self.total())
    }

    /// Scores for one class.
    pub fn class_scores(&self, class: Verdict) -> ClassScores {
        let (tp, predicted, support) = match class {
            Verdict::Pass => (
                self.true_pass,
                self.true_pass + self.false_pass,
                self.true_pass + self.false_fail,
            ),
            Verdict::Fail => (
                self.true_fail,
                self.true_fail + self.false_fail,
                self.true_fail + self.false_pass,
            ),
        };
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        ClassScores {
            precision,
            recall,
            f1: f1(precision, recall),
            support,
        }
    }

    /// Support-weighted (precision, recall, f1).
    pub fn weighted(&self) -> (f64, f64, f64) {
        let total = self.total();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        [Verdict::Pass, Verdict::Fail]
            .into_iter()
            .map(|c| self.class_scores(c))
            .fold((0.0, 0.0, 0.0), |(p, r, f), s| {
                let w = s.support as f64 / total as f64;
                (p + w * s.precision, r + w * s.recall, f + w * s.f1)
            })
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14}{:>10}{:>10}", "", "pred PASS", "pred FAIL")?;
        writeln!(
            f,
            "{:>14}{:>10}{:>10}",
            "actual PASS", self.true_pass, self.false_fail
        )?;
        write!(
            f,
            "{:>14}{:>10}{:>10}",
            "actual FAIL", self.false_pass, self.true_fail
        )
    }
}

/// Support-weighted (precision, recall, f1) of `y_pred` against `y_true`.
pub fn weighted_precision_recall_f1(y_true: &[u8], y_pred: &[u8]) -> (f64, f64, f64) {
    ConfusionMatrix::from_labels(y_true, y_pred).weighted()
}

// =============================================================================
// ClassificationReport
// =============================================================================

/// Per-class and averaged scores, printable as a text table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub pass: ClassScores,
    pub fail: ClassScores,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn from_confusion(m: &ConfusionMatrix) -> Self {
        let pass = m.class_scores(Verdict::Pass);
        let fail = m.class_scores(Verdict::Fail);
        let total = m.total();
        let (wp, wr, wf) = m.weighted();
        Self {
            pass,
            fail,
            accuracy: m.accuracy(),
            macro_avg: ClassScores {
                precision: (pass.precision + fail.precision) / 2.0,
                recall: (pass.recall + fail.recall) / 2.0,
                f1: (pass.f1 + fail.f1) / 2.0,
                support: total,
            },
            weighted_avg: ClassScores {
                precision: wp,
                recall: wr,
                f1: wf,
                support: total,
            },
        }
    }

    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        Self::from_confusion(&ConfusionMatrix::from_labels(y_true, y_pred))
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores| {
            writeln!(
                f,
                "{:>12}{:>10.2}{:>10.2}{:>10.2}{:>10}",
                name, s.precision, s.recall, s.f1, s.support
            )
        };
        writeln!(
            f,
            "{:>12}{:>10}{:>10}{:>10}{:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        row(f, "PASS", &self.pass)?;
        row(f, "FAIL", &self.fail)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}{:>10}{:>10}{:>10.2}{:>10}",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 6 PASS (5 right), 4 FAIL (3 right).
    const Y_TRUE: [u8; 10] = [0, 0, 0, 0, 0, 0, 1, 1, 1, 1];
    const Y_PRED: [u8; 10] = [0, 0, 0, 0, 0, 1, 1, 1, 1, 0];

    #[test]
    fn test_confusion_counts() {
        let m = ConfusionMatrix::from_labels(&Y_TRUE, &Y_PRED);
        assert_eq!(m.true_pass, 5);
        assert_eq!(m.false_fail, 1);
        assert_eq!(m.false_pass, 1);
        assert_eq!(m.true_fail, 3);
        assert_eq!(m.total(), 10);
        assert_eq!(accuracy(&Y_TRUE, &Y_PRED), 0.8);
    }

    #[test]
    fn test_weighted_scores() {
        // PASS: p = 5/6, r = 5/6. FAIL: p = 3/4, r = 3/4.
        let (p, r, f) = weighted_precision_recall_f1(&Y_TRUE, &Y_PRED);
        let expected = 0.6 * (5.0 / 6.0) + 0.4 * 0.75;
        assert!((p - expected).abs() < 1e-12);
        assert!((r - expected).abs() < 1e-12);
        assert!((f - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_scores_zero() {
        let y_true = [0, 0, 1, 1];
        let y_pred = [0, 0, 0, 0];
        let m = ConfusionMatrix::from_labels(&y_true, &y_pred);
        let fail = m.class_scores(Verdict::Fail);
        assert_eq!(fail.precision, 0.0);
        assert_eq!(fail.f1, 0.0);
        let (p, r, _) = m.weighted();
        assert!((p - 0.5 * (2.0 / 4.0)).abs() < 1e-12);
        assert_eq!(r, 0.5);
    }

    #[test]
    fn test_report_text() {
        let report = ClassificationReport::from_labels(&Y_TRUE, &Y_PRED);
        assert_eq!(report.pass.support, 6);
        assert_eq!(report.fail.support, 4);
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("0.80"));
    }

    #[test]
    fn test_mean_std() {
        let (m, s) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert_eq!(s, 2.0);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }
}
