#![warn(missing_docs)]
//! allocbench Statistical Engine
//!
//! Pure numeric routines behind the allocator comparison reports:
//! - Percentiles and quartiles with linear interpolation
//! - IQR fences (whiskers) and outlier detection
//! - Descriptive statistics over the repeated runs of one datapoint
//! - Pairwise allocator comparison (t statistic, effect size, bootstrap)

mod comparison;
mod outliers;
mod percentiles;
mod summary;

pub use comparison::{
    ComparisonConfig, ComparisonError, ComparisonResult, EffectInterpretation,
    compare_distributions,
};
pub use outliers::{OutlierAnalysis, OutlierMethod, detect_outliers};
pub use percentiles::{Quartiles, compute_percentile, compute_quartiles};
pub use summary::{DescriptiveStatistics, describe};

/// Whisker distance from the quartiles, in multiples of the IQR
pub const DEFAULT_WHISKER_MULTIPLIER: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((DEFAULT_WHISKER_MULTIPLIER - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            OutlierMethod::default(),
            OutlierMethod::Iqr {
                k: DEFAULT_WHISKER_MULTIPLIER
            }
        );
    }
}
