//! Outlier Detection
//!
//! Tukey-style fences around the interquartile range. allocbench has always
//! drawn its whiskers at one full IQR beyond the quartiles rather than the
//! textbook 1.5, so that is the default multiplier here.
//!
//! Outliers are reported, never removed: every other statistic is computed
//! from all runs.

use crate::DEFAULT_WHISKER_MULTIPLIER;
use crate::percentiles::{Quartiles, compute_quartiles};

/// Method for outlier detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierMethod {
    /// Values outside `[Q1 - k*IQR, Q3 + k*IQR]` are outliers
    Iqr {
        /// Fence multiplier applied to the interquartile range
        k: f64,
    },
    /// No outlier detection; whiskers sit at the quartiles themselves
    None,
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::Iqr {
            k: DEFAULT_WHISKER_MULTIPLIER,
        }
    }
}

/// Result of outlier analysis
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierAnalysis {
    /// Quartiles the fences were derived from
    pub quartiles: Quartiles,
    /// Lower fence (lower whisker)
    pub lower_bound: f64,
    /// Upper fence (upper whisker)
    pub upper_bound: f64,
    /// Outlier values in original sample order, duplicates kept
    pub outliers: Vec<f64>,
    /// Detection method used
    pub method: OutlierMethod,
}

/// Detect outliers in samples using specified method
///
/// # Examples
///
/// ```
/// # use allocbench_stats::{detect_outliers, OutlierMethod};
/// let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
/// let analysis = detect_outliers(&samples, OutlierMethod::default());
/// assert_eq!(analysis.outliers, vec![100.0]);
/// ```
pub fn detect_outliers(samples: &[f64], method: OutlierMethod) -> OutlierAnalysis {
    let quartiles = compute_quartiles(samples);

    let k = match method {
        OutlierMethod::Iqr { k } => k,
        OutlierMethod::None => 0.0,
    };
    let trimmed_range = quartiles.range();
    let lower_bound = quartiles.lower - k * trimmed_range;
    let upper_bound = quartiles.upper + k * trimmed_range;

    let outliers: Vec<f64> = match method {
        // NaN fences compare false on both sides, so nothing is flagged
        OutlierMethod::Iqr { .. } => samples
            .iter()
            .copied()
            .filter(|&sample| sample < lower_bound || sample > upper_bound)
            .collect(),
        OutlierMethod::None => Vec::new(),
    };

    OutlierAnalysis {
        quartiles,
        lower_bound,
        upper_bound,
        outliers,
        method,
    }
}
