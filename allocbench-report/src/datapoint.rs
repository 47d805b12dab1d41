//! Datapoint evaluation
//!
//! A datapoint is an arithmetic expression over the metrics of a statistics
//! bundle, e.g. `{ops} / {task-clock}`, read at one statistic (usually the
//! mean). Evaluation never fails: anything that cannot be computed becomes
//! NaN and is logged.

use allocbench_core::{BenchmarkResults, Permutation, Statistic};
use allocbench_logic::{Expr, ExprError};
use tracing::warn;

/// Evaluate a datapoint for one allocator and permutation
pub fn evaluate_datapoint(
    results: &BenchmarkResults,
    datapoint: &Expr,
    allocator: &str,
    perm: &Permutation,
    stat: Statistic,
) -> f64 {
    let Some(bundle) = results.statistics(allocator, perm) else {
        warn!(
            benchmark = results.name(),
            allocator, %perm, "No statistics for datapoint {}", datapoint
        );
        return f64::NAN;
    };

    match datapoint.eval(bundle.statistic(stat)) {
        Ok(value) => value,
        Err(ExprError::UnknownMetric(metric)) => {
            warn!(
                benchmark = results.name(),
                allocator, %perm, "Unknown metric '{}' in {}", metric, datapoint
            );
            f64::NAN
        }
        Err(e) => {
            warn!(benchmark = results.name(), "Cannot evaluate {}: {}", datapoint, e);
            f64::NAN
        }
    }
}

/// Datapoint values of an allocator over several permutations
///
/// With `scale`, every value is divided by the baseline allocator's value
/// for the same permutation; the baseline itself maps to exactly 1.
pub fn datapoint_series<'a>(
    results: &BenchmarkResults,
    datapoint: &Expr,
    allocator: &str,
    perms: impl IntoIterator<Item = &'a Permutation>,
    stat: Statistic,
    scale: Option<&str>,
) -> Vec<f64> {
    perms
        .into_iter()
        .map(|perm| match scale {
            Some(baseline) if baseline == allocator => 1.0,
            Some(baseline) => {
                evaluate_datapoint(results, datapoint, allocator, perm, stat)
                    / evaluate_datapoint(results, datapoint, baseline, perm, stat)
            }
            None => evaluate_datapoint(results, datapoint, allocator, perm, stat),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use allocbench_core::{AllocatorDescriptor, ArgumentSpace, Record};

    /// Two allocators over `threads = [1, 2]`, three runs each
    pub(crate) fn sample_results() -> BenchmarkResults {
        let args = ArgumentSpace::new()
            .with_dimension("threads", [1, 2])
            .unwrap();
        let mut results = BenchmarkResults::new("loop", args);
        results.add_allocator("glibc", AllocatorDescriptor::default());
        results.add_allocator("jemalloc", AllocatorDescriptor::default().with_color("C0"));

        let perms: Vec<_> = results.args().permutations().collect();
        for (perm, base) in perms.iter().zip([10.0, 20.0]) {
            for delta in [-1.0, 0.0, 1.0] {
                results
                    .record(
                        "glibc",
                        perm.clone(),
                        Record::new().with("ops", base + delta).with("task-clock", 2.0),
                    )
                    .unwrap();
                results
                    .record(
                        "jemalloc",
                        perm.clone(),
                        Record::new()
                            .with("ops", 2.0 * base + delta)
                            .with("task-clock", 2.0),
                    )
                    .unwrap();
            }
        }
        results.compute_statistics();
        results
    }

    #[test]
    fn test_expression_over_means() {
        let results = sample_results();
        let perm = results.args().permutations().next().unwrap();
        let expr = Expr::parse("{ops} / {task-clock}").unwrap();
        let value = evaluate_datapoint(&results, &expr, "glibc", &perm, Statistic::Mean);
        assert!((value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_metric_is_nan() {
        let results = sample_results();
        let perm = results.args().permutations().next().unwrap();
        let expr = Expr::parse("{VmHWM}").unwrap();
        assert!(evaluate_datapoint(&results, &expr, "glibc", &perm, Statistic::Mean).is_nan());
        assert!(
            evaluate_datapoint(&results, &Expr::Metric("ops".into()), "tcmalloc", &perm, Statistic::Mean)
                .is_nan()
        );
    }

    #[test]
    fn test_scaled_series() {
        let results = sample_results();
        let perms: Vec<_> = results.args().permutations().collect();
        let expr = Expr::Metric("ops".into());

        let baseline =
            datapoint_series(&results, &expr, "glibc", &perms, Statistic::Mean, Some("glibc"));
        assert_eq!(baseline, vec![1.0, 1.0]);

        let scaled =
            datapoint_series(&results, &expr, "jemalloc", &perms, Statistic::Mean, Some("glibc"));
        assert_eq!(scaled, vec![2.0, 2.0]);

        let raw = datapoint_series(&results, &expr, "jemalloc", &perms, Statistic::Mean, None);
        assert_eq!(raw, vec![20.0, 40.0]);
    }
}
