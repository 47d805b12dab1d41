//! Allocator comparison command

use super::formatting::format_comparison_output;
use allocbench_core::BenchmarkResults;
use allocbench_report::compare_allocators;
use allocbench_stats::ComparisonConfig;
use std::path::Path;

/// Which allocators to compare, on what
#[derive(Debug, Clone)]
pub struct CompareRequest<'a> {
    /// Benchmark name
    pub benchmark: &'a str,
    /// Reference allocator
    pub baseline: &'a str,
    /// Allocator under evaluation
    pub candidate: &'a str,
    /// Metric to compare
    pub metric: &'a str,
}

/// Compare two allocators of a saved benchmark; returns the table to print
pub fn compare(
    dir: &Path,
    request: &CompareRequest<'_>,
    config: &ComparisonConfig,
) -> anyhow::Result<String> {
    let results = BenchmarkResults::load(dir, request.benchmark)
        .map_err(|e| anyhow::anyhow!("Cannot load {}: {}", request.benchmark, e))?;

    for allocator in [request.baseline, request.candidate] {
        if !results.allocators().contains_key(allocator) {
            let known: Vec<_> = results.allocator_names().collect();
            anyhow::bail!(
                "Allocator '{}' not in {} (available: {})",
                allocator,
                request.benchmark,
                known.join(", ")
            );
        }
    }

    let comparisons = compare_allocators(
        &results,
        request.baseline,
        request.candidate,
        request.metric,
        config,
    );
    Ok(format_comparison_output(
        request.benchmark,
        request.baseline,
        request.candidate,
        request.metric,
        &comparisons,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocbench_core::{AllocatorDescriptor, ArgumentSpace, Record};

    #[test]
    fn test_compare_saved_results() {
        let dir = tempfile::tempdir().unwrap();
        let args = ArgumentSpace::new().with_dimension("size", [64]).unwrap();
        let mut results = BenchmarkResults::new("larson", args);
        results.add_allocator("glibc", AllocatorDescriptor::default());
        results.add_allocator("jemalloc", AllocatorDescriptor::default());
        let perm = results.args().permutations().next().unwrap();
        for v in [10.0, 11.0, 12.0] {
            results
                .record("glibc", perm.clone(), Record::new().with("ops", v))
                .unwrap();
            results
                .record("jemalloc", perm.clone(), Record::new().with("ops", v + 10.0))
                .unwrap();
        }
        results.save(dir.path()).unwrap();

        let config = ComparisonConfig {
            bootstrap_iterations: 100,
            ..Default::default()
        };
        let request = CompareRequest {
            benchmark: "larson",
            baseline: "glibc",
            candidate: "jemalloc",
            metric: "ops",
        };
        let text = compare(dir.path(), &request, &config).unwrap();
        assert!(text.contains("(size=64)"));
        assert!(text.contains("+90.91%"));
        assert!(text.contains("large"));

        let unknown = CompareRequest {
            candidate: "hoard",
            ..request
        };
        let err = compare(dir.path(), &unknown, &config).unwrap_err();
        assert!(err.to_string().contains("hoard"));
    }
}
