//! Allocator comparison
//!
//! Runs a pairwise comparison of two allocators for one metric on every
//! permutation of a benchmark.

use allocbench_core::{BenchmarkResults, Permutation};
use allocbench_stats::{ComparisonConfig, ComparisonError, ComparisonResult, compare_distributions};

/// Comparison outcome for one permutation
#[derive(Debug, Clone)]
pub struct PermutationComparison {
    /// Compared permutation
    pub perm: Permutation,
    /// Result, or why the runs could not be compared
    pub outcome: Result<ComparisonResult, ComparisonError>,
}

/// Run samples of a metric; runs without a numeric value count as NaN
pub fn metric_samples(
    results: &BenchmarkResults,
    allocator: &str,
    perm: &Permutation,
    metric: &str,
) -> Vec<f64> {
    results
        .runs(allocator, perm)
        .iter()
        .map(|run| run.numeric(metric).unwrap_or(f64::NAN))
        .collect()
}

/// Compare `candidate` against `baseline` on every permutation
pub fn compare_allocators(
    results: &BenchmarkResults,
    baseline: &str,
    candidate: &str,
    metric: &str,
    config: &ComparisonConfig,
) -> Vec<PermutationComparison> {
    results
        .args()
        .permutations()
        .map(|perm| {
            let base = metric_samples(results, baseline, &perm, metric);
            let cand = metric_samples(results, candidate, &perm, metric);
            let outcome = compare_distributions(&base, &cand, config);
            PermutationComparison { perm, outcome }
        })
        .collect()
}
