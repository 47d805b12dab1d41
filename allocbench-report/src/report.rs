//! Report Data Structures
//!
//! A serializable digest of finalized results: per allocator and
//! permutation, the headline statistics of every metric plus any derived
//! metrics evaluated on the means.

use crate::color::allocator_colors;
use crate::facts::SystemInfo;
use allocbench_core::{BenchmarkResults, Facts, Statistic, StatisticsBundle};
use allocbench_logic::{DerivedMetric, DerivedResult, MetricContext, compute_derived};
use serde::Serialize;
use std::collections::BTreeMap;

/// Complete summary over one or more benchmarks
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub benchmarks: Vec<BenchmarkReport>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub version: String,
    pub system: SystemInfo,
}

/// Summary of one benchmark
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub name: String,
    pub allocators: Vec<String>,
    /// Plot color of every allocator, explicit or assigned
    pub colors: BTreeMap<String, String>,
    pub facts: Facts,
    pub datapoints: Vec<DatapointReport>,
}

/// Summary of one allocator and permutation
#[derive(Debug, Clone, Serialize)]
pub struct DatapointReport {
    pub allocator: String,
    /// `name=value` form of the permutation
    pub permutation: String,
    /// Number of recorded runs
    pub runs: usize,
    pub metrics: BTreeMap<String, MetricSummary>,
    pub derived: Vec<DerivedResult>,
}

/// Headline statistics of one metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub std_perc: f64,
    pub min: f64,
    pub max: f64,
    pub outliers: Vec<f64>,
}

impl MetricSummary {
    fn from_bundle(bundle: &StatisticsBundle, metric: &str) -> Self {
        let get = |stat| bundle.get(stat, metric).unwrap_or(f64::NAN);
        Self {
            mean: get(Statistic::Mean),
            median: get(Statistic::Median),
            std: get(Statistic::Std),
            std_perc: get(Statistic::StdPerc),
            min: get(Statistic::Min),
            max: get(Statistic::Max),
            outliers: bundle.outliers(metric).unwrap_or_default().to_vec(),
        }
    }
}

/// Summarize one benchmark
///
/// Permutations without statistics are left out. Derived metrics see the
/// mean of every metric.
pub fn build_benchmark_report(results: &BenchmarkResults, derived: &[DerivedMetric]) -> BenchmarkReport {
    let mut datapoints = Vec::new();
    for allocator in results.allocator_names() {
        for perm in results.args().permutations() {
            let Some(bundle) = results.statistics(allocator, &perm) else {
                continue;
            };

            let metrics = bundle
                .metrics()
                .map(|m| (m.to_string(), MetricSummary::from_bundle(bundle, m)))
                .collect();
            let context: MetricContext = bundle
                .statistic(Statistic::Mean)
                .iter()
                .map(|(k, v)| (k.as_str(), *v))
                .collect();

            datapoints.push(DatapointReport {
                allocator: allocator.to_string(),
                permutation: perm.to_string(),
                runs: results.runs(allocator, &perm).len(),
                metrics,
                derived: compute_derived(derived, &context),
            });
        }
    }

    BenchmarkReport {
        name: results.name().to_string(),
        allocators: results.allocator_names().map(str::to_string).collect(),
        colors: allocator_colors(results.allocators()),
        facts: results.facts().clone(),
        datapoints,
    }
}

/// Summarize several benchmarks
pub fn build_report(
    benchmarks: &[BenchmarkResults],
    derived: &[DerivedMetric],
    system: SystemInfo,
) -> Report {
    Report {
        meta: ReportMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            system,
        },
        benchmarks: benchmarks
            .iter()
            .map(|b| build_benchmark_report(b, derived))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapoint::tests::sample_results;

    #[test]
    fn test_benchmark_report() {
        let results = sample_results();
        let derived = vec![
            "per_clock = {ops} / {task-clock}"
                .parse::<DerivedMetric>()
                .unwrap(),
        ];
        let report = build_benchmark_report(&results, &derived);

        assert_eq!(report.allocators, vec!["glibc", "jemalloc"]);
        // jemalloc keeps its own color, glibc gets the next free one
        assert_eq!(report.colors["jemalloc"], "C0");
        assert_eq!(report.colors["glibc"], "C1");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["colors"]["glibc"], "C1");
        assert_eq!(report.datapoints.len(), 4);

        let first = &report.datapoints[0];
        assert_eq!(first.allocator, "glibc");
        assert_eq!(first.permutation, "(threads=1)");
        assert_eq!(first.runs, 3);
        assert_eq!(first.metrics["ops"].mean, 10.0);
        assert_eq!(first.derived[0].value, Some(5.0));
    }
}
