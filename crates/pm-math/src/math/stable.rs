//! Numerically stable accumulation primitives.

/// Neumaier-compensated sum.
///
/// Returns 0.0 for empty input. NaN propagates.
pub fn compensated_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Arithmetic mean, or None for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(compensated_sum(values) / values.len() as f64)
}

/// Sample variance (n − 1 denominator) via Welford's update.
///
/// None when fewer than two values are given.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mut n = 0.0_f64;
    let mut running_mean = 0.0_f64;
    let mut m2 = 0.0_f64;
    for &v in values {
        n += 1.0;
        let delta = v - running_mean;
        running_mean += delta / n;
        m2 += delta * (v - running_mean);
    }
    Some((m2 / (n - 1.0)).max(0.0))
}

/// Median of the values, averaging the two middle elements for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compensated_sum_basic() {
        assert_eq!(compensated_sum(&[]), 0.0);
        assert_eq!(compensated_sum(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn test_compensated_sum_cancellation() {
        // Naive left-to-right summation returns 0.0 here.
        let values = [1.0, 1e100, 1.0, -1e100];
        assert_eq!(compensated_sum(&values), 2.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[86_400.0, 172_800.0]), Some(129_600.0));
    }

    #[test]
    fn test_sample_variance() {
        assert_eq!(sample_variance(&[5.0]), None);
        let v = sample_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((v - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}
