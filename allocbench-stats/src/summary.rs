//! Descriptive Statistics
//!
//! Summarizes the repeated runs of one metric for one allocator and argument
//! permutation. Unlike a latency harness nothing is cleaned here: a handful of
//! runs per datapoint is normal, so every statistic sees every run and the
//! outliers are only reported.
//!
//! NaN handling: a missing run is NaN and poisons min, max, mean, median and
//! the quartiles. Nothing in this module panics on NaN input.

use crate::outliers::{OutlierMethod, detect_outliers};
use crate::percentiles::compute_percentile;

/// Descriptive statistics of one metric over all runs
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStatistics {
    pub sample_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (divisor n-1)
    pub std: f64,
    /// Relative standard deviation (`std / mean`)
    pub std_perc: f64,
    pub lower_quartile: f64,
    pub upper_quartile: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    /// Runs beyond the whiskers, in run order
    pub outliers: Vec<f64>,
}

/// Compute descriptive statistics over all samples
///
/// An empty slice yields NaN everywhere and no outliers. A single sample has
/// an undefined sample standard deviation, reported as NaN.
pub fn describe(samples: &[f64], outlier_method: OutlierMethod) -> DescriptiveStatistics {
    let n = samples.len();
    let analysis = detect_outliers(samples, outlier_method);

    let mean = if n == 0 {
        f64::NAN
    } else {
        samples.iter().sum::<f64>() / n as f64
    };

    let std = if n < 2 {
        f64::NAN
    } else {
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    };

    let std_perc = if mean == 0.0 { f64::NAN } else { std / mean };

    DescriptiveStatistics {
        sample_count: n,
        min: nan_aware_fold(samples, f64::min),
        max: nan_aware_fold(samples, f64::max),
        mean,
        median: compute_percentile(samples, 50.0),
        std,
        std_perc,
        lower_quartile: analysis.quartiles.lower,
        upper_quartile: analysis.quartiles.upper,
        lower_whisker: analysis.lower_bound,
        upper_whisker: analysis.upper_bound,
        outliers: analysis.outliers,
    }
}

// f64::min/max skip NaN; a failed run must show up instead.
fn nan_aware_fold(samples: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    match samples.split_first() {
        Some((&first, rest)) if !samples.iter().any(|x| x.is_nan()) => {
            rest.iter().copied().fold(first, pick)
        }
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_sample_std() {
        let samples = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = describe(&samples, OutlierMethod::default());

        assert!(close(stats.mean, 5.0));
        assert!(close(stats.std, 2.13809));
        assert!(close(stats.std_perc, 2.13809 / 5.0));
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert!(close(stats.median, 4.5));
        assert_eq!(stats.sample_count, 8);
    }

    #[test]
    fn test_whiskers_and_outliers() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let stats = describe(&samples, OutlierMethod::default());

        assert!(close(stats.lower_quartile, 3.25));
        assert!(close(stats.upper_quartile, 7.75));
        assert!(close(stats.lower_whisker, -1.25));
        assert!(close(stats.upper_whisker, 12.25));
        assert_eq!(stats.outliers, vec![100.0]);
        // Nothing is cleaned: the outlier still drives max and mean
        assert_eq!(stats.max, 100.0);
        assert!(close(stats.mean, 14.5));
    }

    #[test]
    fn test_single_run() {
        let stats = describe(&[7.0], OutlierMethod::default());

        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.min, 7.0);
        assert!(stats.std.is_nan());
        assert!(stats.std_perc.is_nan());
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_zero_mean() {
        let stats = describe(&[-1.0, 1.0, 0.0], OutlierMethod::default());
        assert_eq!(stats.mean, 0.0);
        assert!(stats.std > 0.0);
        assert!(stats.std_perc.is_nan());
    }

    #[test]
    fn test_missing_run_poisons() {
        let stats = describe(&[5.0, f64::NAN], OutlierMethod::default());

        assert!(stats.mean.is_nan());
        assert!(stats.min.is_nan());
        assert!(stats.max.is_nan());
        assert!(stats.median.is_nan());
        assert!(stats.std.is_nan());
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_all_nan() {
        let stats = describe(&[f64::NAN, f64::NAN], OutlierMethod::default());
        assert!(stats.min.is_nan());
        assert!(stats.upper_whisker.is_nan());
    }

    #[test]
    fn test_empty_samples() {
        let stats = describe(&[], OutlierMethod::default());
        assert_eq!(stats.sample_count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.min.is_nan());
    }
}
