//! Stratified train/test splitting and k-fold cross-validation.
//!
//! Both preserve the PASS/FAIL proportions of the input. Splits return row
//! indices in ascending order so callers can gather rows deterministically.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{ModelError, ModelResult};

/// Row indices per class: `[pass, fail]`.
fn class_indices(y: &[u8]) -> [Vec<usize>; 2] {
    let mut groups = [Vec::new(), Vec::new()];
    for (i, &label) in y.iter().enumerate() {
        groups[usize::from(label != 0)].push(i);
    }
    groups
}

/// Split row indices into `(train, test)` with per-class proportions kept.
///
/// The test partition holds `ceil(test_fraction * n)` rows, allocated to
/// classes by largest remainder, with at least one row of each class on
/// both sides.
pub fn stratified_split(
    y: &[u8],
    test_fraction: f64,
    seed: u64,
) -> ModelResult<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidHyperparameters(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let n = y.len();
    let groups = class_indices(y);
    let present: Vec<usize> = (0..2).filter(|&c| !groups[c].is_empty()).collect();
    if let Some(&c) = present.iter().find(|&&c| groups[c].len() < 2) {
        return Err(ModelError::InsufficientSamples(format!(
            "class {} has {} member(s); need at least 2 to split",
            c,
            groups[c].len()
        )));
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test < present.len() || n - n_test < present.len() {
        return Err(ModelError::InsufficientSamples(format!(
            "{} rows cannot be split with test fraction {}",
            n, test_fraction
        )));
    }

    // Largest-remainder allocation of n_test across classes.
    let exact: Vec<f64> = (0..2)
        .map(|c| n_test as f64 * groups[c].len() as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut short = n_test - alloc.iter().sum::<usize>();
    let mut by_remainder: Vec<usize> = vec![0, 1];
    by_remainder.sort_by(|&a, &b| {
        (exact[b] - exact[b].floor()).total_cmp(&(exact[a] - exact[a].floor()))
    });
    for &c in by_remainder.iter().cycle().take(4) {
        if short == 0 {
            break;
        }
        if alloc[c] < groups[c].len() {
            alloc[c] += 1;
            short -= 1;
        }
    }
    for &c in &present {
        alloc[c] = alloc[c].clamp(1, groups[c].len() - 1);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n);
    let mut test = Vec::with_capacity(n_test);
    for (c, mut members) in groups.into_iter().enumerate() {
        members.shuffle(&mut rng);
        let (t, rest) = members.split_at(alloc[c].min(members.len()));
        test.extend_from_slice(t);
        train.extend_from_slice(rest);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

// =============================================================================
// StratifiedKFold
// =============================================================================

/// One cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold without shuffling.
///
/// Each class's rows, in input order, are cut into `n_splits` contiguous
/// chunks whose sizes differ by at most one; fold `k` tests on chunk `k` of
/// every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    pub n_splits: usize,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self { n_splits: 5 }
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split(&self, y: &[u8]) -> ModelResult<Vec<Fold>> {
        let k = self.n_splits;
        if k < 2 {
            return Err(ModelError::InvalidHyperparameters(format!(
                "n_splits must be at least 2, got {}",
                k
            )));
        }
        let groups = class_indices(y);
        if let Some(small) = groups.iter().find(|g| !g.is_empty() && g.len() < k) {
            return Err(ModelError::InsufficientSamples(format!(
                "a class has {} member(s); need at least {} for {}-fold CV",
                small.len(),
                k,
                k
            )));
        }

        let mut fold_of = vec![0usize; y.len()];
        for members in &groups {
            let base = members.len() / k;
            let extra = members.len() % k;
            let mut start = 0;
            for fold in 0..k {
                let size = base + usize::from(fold < extra);
                for &i in &members[start..start + size] {
                    fold_of[i] = fold;
                }
                start += size;
            }
        }

        Ok((0..k)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..y.len()).partition(|&i| fold_of[i] == fold);
                Fold { train, test }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_pass: usize, n_fail: usize) -> Vec<u8> {
        let mut y = vec![0u8; n_pass];
        y.extend(vec![1u8; n_fail]);
        y
    }

    #[test]
    fn test_split_proportions() {
        let y = labels(80, 20);
        let (train, test) = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(test.len(), 20);
        assert_eq!(train.len(), 80);
        assert_eq!(test.iter().filter(|&&i| y[i] == 1).count(), 4);
        assert_eq!(train.iter().filter(|&&i| y[i] == 1).count(), 16);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rounds_up() {
        let y = labels(7, 4);
        let (train, test) = stratified_split(&y, 0.2, 1).unwrap();
        // ceil(0.2 * 11) = 3
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
        assert!(test.iter().any(|&i| y[i] == 1));
        assert!(test.iter().any(|&i| y[i] == 0));
    }

    #[test]
    fn test_split_is_seeded() {
        let y = labels(50, 50);
        assert_eq!(
            stratified_split(&y, 0.3, 5).unwrap(),
            stratified_split(&y, 0.3, 5).unwrap()
        );
        assert_ne!(
            stratified_split(&y, 0.3, 5).unwrap().1,
            stratified_split(&y, 0.3, 6).unwrap().1
        );
    }

    #[test]
    fn test_split_rejects_tiny_class() {
        let y = labels(30, 1);
        assert!(matches!(
            stratified_split(&y, 0.2, 0),
            Err(ModelError::InsufficientSamples(_))
        ));
        assert!(stratified_split(&labels(5, 5), 1.0, 0).is_err());
    }

    #[test]
    fn test_kfold_covers_every_row_once() {
        let y = labels(23, 12);
        let folds = StratifiedKFold::new(5).split(&y).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0; y.len()];
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), y.len());
            for &i in &fold.test {
                seen[i] += 1;
            }
            let fails = fold.test.iter().filter(|&&i| y[i] == 1).count();
            assert!(fails == 2 || fails == 3);
        }
        assert!(seen.iter().all(|&c| c == 1));
        // First chunks take the remainder.
        assert_eq!(folds[0].test.len(), 5 + 3);
        assert_eq!(folds[4].test.len(), 4 + 2);
    }

    #[test]
    fn test_kfold_rejects_small_class() {
        let y = labels(20, 3);
        assert!(StratifiedKFold::new(5).split(&y).is_err());
        assert!(StratifiedKFold::new(1).split(&y).is_err());
    }
}
