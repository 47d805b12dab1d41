//! Allocator Comparison
//!
//! Compares the runs of two allocators for one metric and permutation:
//! Student's t statistic with pooled variance, Cohen's d, and a bootstrap
//! estimate of the probability that the candidate's mean exceeds the
//! baseline's.

use crate::outliers::OutlierMethod;
use crate::summary::{DescriptiveStatistics, describe};
use rand::prelude::*;
use rayon::prelude::*;

/// Result of comparing two allocators' runs
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// Statistics for the baseline allocator
    pub baseline_stats: DescriptiveStatistics,
    /// Statistics for the candidate allocator
    pub candidate_stats: DescriptiveStatistics,
    /// Relative change in percent: (candidate - baseline) / baseline * 100
    pub relative_change: f64,
    /// Absolute change of the means
    pub absolute_change: f64,
    /// Student's t statistic (pooled variance)
    pub t_statistic: f64,
    /// Degrees of freedom of the t statistic
    pub degrees_of_freedom: usize,
    /// Probability that the candidate's mean is larger (0.0 to 1.0)
    pub probability_increase: f64,
    /// Effect size (Cohen's d)
    pub effect_size: f64,
    /// Effect size interpretation
    pub effect_interpretation: EffectInterpretation,
}

/// Interpretation of effect size magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectInterpretation {
    /// |d| < 0.2 - negligible difference
    Negligible,
    /// 0.2 <= |d| < 0.5 - small difference
    Small,
    /// 0.5 <= |d| < 0.8 - medium difference
    Medium,
    /// |d| >= 0.8 - large difference
    Large,
}

impl std::fmt::Display for EffectInterpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectInterpretation::Negligible => write!(f, "negligible"),
            EffectInterpretation::Small => write!(f, "small"),
            EffectInterpretation::Medium => write!(f, "medium"),
            EffectInterpretation::Large => write!(f, "large"),
        }
    }
}

/// Configuration for comparison
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Number of bootstrap iterations
    pub bootstrap_iterations: usize,
    /// Outlier method used for the per-allocator statistics
    pub outlier_method: OutlierMethod,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            bootstrap_iterations: 10_000,
            outlier_method: OutlierMethod::default(),
        }
    }
}

/// Compare two allocators' run samples
pub fn compare_distributions(
    baseline: &[f64],
    candidate: &[f64],
    config: &ComparisonConfig,
) -> Result<ComparisonResult, ComparisonError> {
    if baseline.is_empty() {
        return Err(ComparisonError::EmptyBaseline);
    }
    if candidate.is_empty() {
        return Err(ComparisonError::EmptyCandidate);
    }
    if baseline.len() < 2 {
        return Err(ComparisonError::InsufficientBaseline);
    }
    if candidate.len() < 2 {
        return Err(ComparisonError::InsufficientCandidate);
    }
    if baseline.iter().chain(candidate).any(|x| x.is_nan()) {
        return Err(ComparisonError::MissingRuns);
    }

    let baseline_stats = describe(baseline, config.outlier_method);
    let candidate_stats = describe(candidate, config.outlier_method);

    let observed_diff = candidate_stats.mean - baseline_stats.mean;
    let relative_change = if baseline_stats.mean != 0.0 {
        (observed_diff / baseline_stats.mean) * 100.0
    } else {
        f64::NAN
    };

    // Pooled standard deviation
    let n1 = baseline.len() as f64;
    let n2 = candidate.len() as f64;
    let var1 = baseline_stats.std.powi(2);
    let var2 = candidate_stats.std.powi(2);
    let pooled_std = ((((n1 - 1.0) * var1) + ((n2 - 1.0) * var2)) / (n1 + n2 - 2.0)).sqrt();

    let effect_size = if pooled_std > 0.0 {
        observed_diff / pooled_std
    } else {
        0.0
    };

    let standard_error = pooled_std * (1.0 / n1 + 1.0 / n2).sqrt();
    let t_statistic = if standard_error > 0.0 {
        observed_diff / standard_error
    } else if observed_diff == 0.0 {
        0.0
    } else {
        observed_diff.signum() * f64::INFINITY
    };

    let probability_increase =
        bootstrap_probability_increase(baseline, candidate, config.bootstrap_iterations);

    Ok(ComparisonResult {
        baseline_stats,
        candidate_stats,
        relative_change,
        absolute_change: observed_diff,
        t_statistic,
        degrees_of_freedom: baseline.len() + candidate.len() - 2,
        probability_increase,
        effect_size,
        effect_interpretation: interpret_effect_size(effect_size),
    })
}

fn bootstrap_probability_increase(baseline: &[f64], candidate: &[f64], iterations: usize) -> f64 {
    if iterations == 0 {
        return f64::NAN;
    }

    let increases = (0..iterations)
        .into_par_iter()
        .map_init(thread_rng, |rng, _| {
            let baseline_mean: f64 = (0..baseline.len())
                .map(|_| baseline[rng.gen_range(0..baseline.len())])
                .sum::<f64>()
                / baseline.len() as f64;

            let candidate_mean: f64 = (0..candidate.len())
                .map(|_| candidate[rng.gen_range(0..candidate.len())])
                .sum::<f64>()
                / candidate.len() as f64;

            candidate_mean > baseline_mean
        })
        .filter(|&increased| increased)
        .count();

    increases as f64 / iterations as f64
}

/// Interpret effect size magnitude using Cohen's conventions
fn interpret_effect_size(d: f64) -> EffectInterpretation {
    let abs_d = d.abs();
    if abs_d < 0.2 {
        EffectInterpretation::Negligible
    } else if abs_d < 0.5 {
        EffectInterpretation::Small
    } else if abs_d < 0.8 {
        EffectInterpretation::Medium
    } else {
        EffectInterpretation::Large
    }
}

/// Errors from comparison operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComparisonError {
    #[error("Baseline samples are empty")]
    EmptyBaseline,
    #[error("Candidate samples are empty")]
    EmptyCandidate,
    #[error("Baseline needs at least 2 samples")]
    InsufficientBaseline,
    #[error("Candidate needs at least 2 samples")]
    InsufficientCandidate,
    #[error("Samples contain failed runs")]
    MissingRuns,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ComparisonConfig {
        ComparisonConfig {
            bootstrap_iterations: 1000,
            ..Default::default()
        }
    }

    #[test]
    fn test_compare_identical() {
        let samples = vec![100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 101.0, 99.0];
        let result = compare_distributions(&samples, &samples, &config()).unwrap();

        assert!(result.probability_increase > 0.2 && result.probability_increase < 0.8);
        assert!(result.relative_change.abs() < 1e-9);
        assert!(result.t_statistic.abs() < 1e-9);
        assert_eq!(result.degrees_of_freedom, 14);
        assert_eq!(
            result.effect_interpretation,
            EffectInterpretation::Negligible
        );
    }

    #[test]
    fn test_compare_clear_increase() {
        let baseline = vec![100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 101.0, 99.0];
        let candidate = vec![200.0, 202.0, 198.0, 201.0, 199.0, 200.0, 201.0, 199.0];
        let result = compare_distributions(&baseline, &candidate, &config()).unwrap();

        assert!(result.probability_increase > 0.95);
        assert!((result.relative_change - 100.0).abs() < 1e-9);
        assert!(result.t_statistic > 10.0);
        assert_eq!(result.effect_interpretation, EffectInterpretation::Large);
    }

    #[test]
    fn test_compare_clear_decrease() {
        let baseline = vec![200.0, 202.0, 198.0, 201.0, 199.0, 200.0, 201.0, 199.0];
        let candidate = vec![100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 101.0, 99.0];
        let result = compare_distributions(&baseline, &candidate, &config()).unwrap();

        assert!(result.probability_increase < 0.05);
        assert!(result.relative_change < -40.0);
        assert!(result.t_statistic < -10.0);
    }

    #[test]
    fn test_known_t_statistic() {
        // means 2 and 5, both variances 1 -> pooled std 1, se = sqrt(2/3)
        let baseline = vec![1.0, 2.0, 3.0];
        let candidate = vec![4.0, 5.0, 6.0];
        let result = compare_distributions(&baseline, &candidate, &config()).unwrap();

        let expected = 3.0 / (2.0f64 / 3.0).sqrt();
        assert!((result.t_statistic - expected).abs() < 1e-9);
        assert!((result.effect_size - 3.0).abs() < 1e-9);
        assert_eq!(result.degrees_of_freedom, 4);
    }

    #[test]
    fn test_effect_size_interpretation() {
        assert_eq!(interpret_effect_size(0.1), EffectInterpretation::Negligible);
        assert_eq!(interpret_effect_size(0.3), EffectInterpretation::Small);
        assert_eq!(interpret_effect_size(0.6), EffectInterpretation::Medium);
        assert_eq!(interpret_effect_size(1.0), EffectInterpretation::Large);
        assert_eq!(interpret_effect_size(-0.5), EffectInterpretation::Medium);
    }

    #[test]
    fn test_rejects_bad_input() {
        let config = ComparisonConfig::default();

        assert!(matches!(
            compare_distributions(&[], &[1.0, 2.0], &config),
            Err(ComparisonError::EmptyBaseline)
        ));
        assert!(matches!(
            compare_distributions(&[1.0, 2.0], &[], &config),
            Err(ComparisonError::EmptyCandidate)
        ));
        assert!(matches!(
            compare_distributions(&[1.0], &[1.0, 2.0], &config),
            Err(ComparisonError::InsufficientBaseline)
        ));
        assert!(matches!(
            compare_distributions(&[1.0, f64::NAN], &[1.0, 2.0], &config),
            Err(ComparisonError::MissingRuns)
        ));
    }
}
