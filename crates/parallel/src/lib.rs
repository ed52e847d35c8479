//! Declarative parallel/sequential execution for model fitting.
//!
//! Tree fitting, cross-validation folds and grid-search candidates are
//! independent units of work. These helpers run them through rayon when the
//! `parallel` feature is enabled and through plain iterators otherwise, so
//! the `cfg` logic lives in one place.
//!
//! Every helper returns results in input order. Callers derive any
//! randomness from the item or index, never from a shared RNG, so a parallel
//! run produces exactly what a sequential run would.
//!
//! # Example
//!
//! ```ignore
//! let trees = parallel::map_indices(n_trees, |i| fit_tree(seed + i as u64), false);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Map a function over a slice, potentially in parallel.
///
/// # Parameters
/// - `force_sequential`: run on the calling thread even if `parallel` is enabled
#[inline]
pub fn map_slice<T, F, R>(slice: &[T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            slice.iter().map(f).collect()
        } else {
            slice.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        slice.iter().map(f).collect()
    }
}

/// Map a function over `0..n`, potentially in parallel.
#[inline]
pub fn map_indices<F, R>(n: usize, f: F, force_sequential: bool) -> Vec<R>
where
    F: Fn(usize) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            (0..n).map(f).collect()
        } else {
            (0..n).into_par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        (0..n).map(f).collect()
    }
}

/// Map a fallible function over a slice, stopping at the first error.
///
/// With `parallel` enabled other items may already have run when the error
/// is observed; which error is returned is unspecified if several fail.
#[inline]
pub fn try_map_slice<T, F, R, E>(slice: &[T], f: F, force_sequential: bool) -> Result<Vec<R>, E>
where
    T: Sync,
    F: Fn(&T) -> Result<R, E> + Sync + Send,
    R: Send,
    E: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            slice.iter().map(f).collect()
        } else {
            slice.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        slice.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_slice_preserves_order() {
        let items: Vec<u64> = (0..1000).collect();
        let seq = map_slice(&items, |x| x * 3, true);
        let par = map_slice(&items, |x| x * 3, false);
        assert_eq!(seq, par);
        assert_eq!(par[999], 2997);
    }

    #[test]
    fn test_map_indices() {
        let squares = map_indices(5, |i| i * i, false);
        assert_eq!(squares, vec![0, 1, 4, 9, 16]);
        assert!(map_indices(0, |i| i, false).is_empty());
    }

    #[test]
    fn test_try_map_slice_error() {
        let items = [1, 2, 3, 4];
        let ok: Result<Vec<i32>, String> = try_map_slice(&items, |x| Ok(x + 1), false);
        assert_eq!(ok.unwrap(), vec![2, 3, 4, 5]);

        let err: Result<Vec<i32>, String> = try_map_slice(
            &items,
            |x| if *x == 3 { Err("three".to_string()) } else { Ok(*x) },
            true,
        );
        assert_eq!(err.unwrap_err(), "three");
    }
}
