//! Property-based tests for pm-math summary statistics.

use pm_math::{compensated_sum, mean, median, sample_variance, Summary, SENTINEL};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-9;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

fn durations() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1.0e7f64, 1..200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// min <= median <= max and min <= mean <= max.
    #[test]
    fn summary_is_bounded(samples in durations()) {
        let s = Summary::from_samples(&samples).unwrap();
        prop_assert!(s.min <= s.median && s.median <= s.max);
        prop_assert!(s.min - TOL <= s.mean && s.mean <= s.max + TOL);
    }

    /// sum equals mean times count.
    #[test]
    fn sum_matches_mean(samples in durations()) {
        let s = Summary::from_samples(&samples).unwrap();
        prop_assert!(approx_eq(s.sum, s.mean * samples.len() as f64, TOL));
    }

    /// Sample order does not change any statistic.
    #[test]
    fn summary_is_order_independent(samples in durations()) {
        let mut reversed = samples.clone();
        reversed.reverse();
        let a = Summary::from_samples(&samples).unwrap();
        let b = Summary::from_samples(&reversed).unwrap();
        prop_assert_eq!(a.median, b.median);
        prop_assert_eq!(a.min, b.min);
        prop_assert_eq!(a.max, b.max);
        prop_assert!(approx_eq(a.sum, b.sum, TOL));
        prop_assert!(approx_eq(a.stdev, b.stdev, 1e-6));
    }

    /// stdev is the sentinel exactly when there is a single sample.
    #[test]
    fn stdev_sentinel_iff_single(samples in durations()) {
        let s = Summary::from_samples(&samples).unwrap();
        if samples.len() == 1 {
            prop_assert_eq!(s.stdev, SENTINEL);
        } else {
            prop_assert!(s.stdev >= 0.0);
        }
    }

    /// A constant sample has zero variance.
    #[test]
    fn constant_sample_zero_variance(v in 0.0..1.0e6f64, n in 2usize..50) {
        let samples = vec![v; n];
        let var = sample_variance(&samples).unwrap();
        prop_assert!(var.abs() <= TOL * v.max(1.0));
        prop_assert_eq!(median(&samples), Some(v));
        prop_assert!(approx_eq(mean(&samples).unwrap(), v, TOL));
    }

    /// Compensated sum of integers is exact.
    #[test]
    fn compensated_sum_exact_for_integers(values in prop::collection::vec(-1_000_000i64..1_000_000, 0..100)) {
        let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        let expected: i64 = values.iter().sum();
        prop_assert_eq!(compensated_sum(&as_f64), expected as f64);
    }
}
