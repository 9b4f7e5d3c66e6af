//! Random train/test partitioning of row indices.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{Result, TriageError};

/// Row indices of the two sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` and hold out `ceil(test_fraction * n)` rows for testing.
///
/// Without a seed the shuffle draws from OS entropy and differs run to run.
pub fn train_test_split(n: usize, test_fraction: f64, seed: Option<u64>) -> Result<SplitIndices> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TriageError::validation(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(TriageError::validation(format!(
            "cannot split {n} rows with test fraction {test_fraction}: one side would be empty"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    let train = order.split_off(n_test);
    Ok(SplitIndices { train, test: order })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(split: &SplitIndices, n: usize) {
        let mut seen = vec![false; n];
        for &idx in split.train.iter().chain(split.test.iter()) {
            assert!(!seen[idx], "row {idx} appears twice");
            seen[idx] = true;
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn split_is_a_partition_for_many_ratios() {
        for &fraction in &[0.01, 0.2, 0.5, 0.73, 0.99] {
            for n in [2usize, 7, 100, 1001] {
                let Ok(split) = train_test_split(n, fraction, Some(7)) else {
                    continue;
                };
                assert_partition(&split, n);
            }
        }
    }

    #[test]
    fn default_ratio_holds_out_twenty_percent_rounded_up() {
        let split = train_test_split(101, 0.2, Some(1)).unwrap();
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);
        assert_partition(&split, 101);
    }

    #[test]
    fn seeded_split_is_reproducible() {
        let a = train_test_split(50, 0.2, Some(42)).unwrap();
        let b = train_test_split(50, 0.2, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unseeded_split_is_still_a_partition() {
        let split = train_test_split(40, 0.25, None).unwrap();
        assert_eq!(split.test.len(), 10);
        assert_partition(&split, 40);
    }

    #[test]
    fn rejects_bad_fraction_and_tiny_inputs() {
        assert!(train_test_split(10, 0.0, None).is_err());
        assert!(train_test_split(10, 1.0, None).is_err());
        assert!(train_test_split(10, f64::NAN, None).is_err());
        assert!(train_test_split(1, 0.2, None).is_err());
    }
}
