//! Six-number summaries of duration samples.
//!
//! Graph edges and the time-between-events metric report inter-event
//! durations as `{median, min, max, stdev, sum, mean}` in seconds.

use super::stable::{compensated_sum, median, sample_variance};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Value reported for statistics that are undefined or synthetic.
pub const SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; [`SENTINEL`] with fewer than two samples.
    pub stdev: f64,
    pub sum: f64,
    pub mean: f64,
}

impl Summary {
    /// Summarize a non-empty sample. Returns None for empty input.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let median = median(samples)?;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum = compensated_sum(samples);
        let mean = sum / samples.len() as f64;
        let stdev = sample_variance(samples)
            .map(f64::sqrt)
            .filter(|s| s.is_finite())
            .unwrap_or(SENTINEL);

        Some(Summary {
            median,
            min,
            max,
            stdev,
            sum,
            mean,
        })
    }

    /// Summary with every statistic set to [`SENTINEL`].
    pub fn sentinel() -> Self {
        Summary {
            median: SENTINEL,
            min: SENTINEL,
            max: SENTINEL,
            stdev: SENTINEL,
            sum: SENTINEL,
            mean: SENTINEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        assert!(Summary::from_samples(&[]).is_none());
    }

    #[test]
    fn test_single_sample_has_sentinel_stdev() {
        let s = Summary::from_samples(&[86_400.0]).unwrap();
        assert_eq!(s.median, 86_400.0);
        assert_eq!(s.min, 86_400.0);
        assert_eq!(s.max, 86_400.0);
        assert_eq!(s.sum, 86_400.0);
        assert_eq!(s.mean, 86_400.0);
        assert_eq!(s.stdev, SENTINEL);
    }

    #[test]
    fn test_two_samples() {
        let s = Summary::from_samples(&[10.0, 20.0]).unwrap();
        assert_eq!(s.median, 15.0);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 20.0);
        assert_eq!(s.sum, 30.0);
        assert_eq!(s.mean, 15.0);
        assert!((s.stdev - 50.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sentinel_summary() {
        let s = Summary::sentinel();
        assert_eq!(s.min, -1.0);
        assert_eq!(s.stdev, -1.0);
    }
}
