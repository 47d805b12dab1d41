//! Statistics pass
//!
//! Turns the raw runs of every allocator and permutation into a
//! [`StatisticsBundle`]: one map per statistic, keyed by metric name.
//! Allocators are processed in parallel; each writes only its own table.

use crate::permutation::Permutation;
use crate::record::Record;
use crate::results::BenchmarkResults;
use allocbench_stats::{DescriptiveStatistics, OutlierMethod, describe};
use fxhash::FxHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Statistics of every permutation of one allocator
pub type StatisticsTable = FxHashMap<Permutation, StatisticsBundle>;

/// A scalar statistic stored in a [`StatisticsBundle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Statistic {
    /// Smallest run
    Min,
    /// Largest run
    Max,
    /// Arithmetic mean
    Mean,
    /// 50th percentile
    Median,
    /// Sample standard deviation
    Std,
    /// Standard deviation relative to the mean
    StdPerc,
    /// 25th percentile
    LowerQuartile,
    /// 75th percentile
    UpperQuartile,
    /// Lower IQR fence
    LowerWhisker,
    /// Upper IQR fence
    UpperWhisker,
}

impl Statistic {
    /// All scalar statistics in storage order
    pub const ALL: [Statistic; 10] = [
        Statistic::Min,
        Statistic::Max,
        Statistic::Mean,
        Statistic::Median,
        Statistic::Std,
        Statistic::StdPerc,
        Statistic::LowerQuartile,
        Statistic::UpperQuartile,
        Statistic::LowerWhisker,
        Statistic::UpperWhisker,
    ];

    /// Name used in saved results and exports
    pub fn as_str(self) -> &'static str {
        match self {
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Std => "std",
            Statistic::StdPerc => "std_perc",
            Statistic::LowerQuartile => "lower_quartile",
            Statistic::UpperQuartile => "upper_quartile",
            Statistic::LowerWhisker => "lower_whisker",
            Statistic::UpperWhisker => "upper_whisker",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| format!("unknown statistic '{}'", s))
    }
}

/// Statistics of one allocator and permutation, keyed by metric
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsBundle {
    #[serde(default, with = "crate::float::map")]
    min: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    max: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    mean: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    median: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    std: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    std_perc: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    lower_quartile: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    upper_quartile: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    lower_whisker: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::map")]
    upper_whisker: BTreeMap<String, f64>,
    #[serde(default, with = "crate::float::list_map")]
    outliers: BTreeMap<String, Vec<f64>>,
}

impl StatisticsBundle {
    fn map(&self, stat: Statistic) -> &BTreeMap<String, f64> {
        match stat {
            Statistic::Min => &self.min,
            Statistic::Max => &self.max,
            Statistic::Mean => &self.mean,
            Statistic::Median => &self.median,
            Statistic::Std => &self.std,
            Statistic::StdPerc => &self.std_perc,
            Statistic::LowerQuartile => &self.lower_quartile,
            Statistic::UpperQuartile => &self.upper_quartile,
            Statistic::LowerWhisker => &self.lower_whisker,
            Statistic::UpperWhisker => &self.upper_whisker,
        }
    }

    fn map_mut(&mut self, stat: Statistic) -> &mut BTreeMap<String, f64> {
        match stat {
            Statistic::Min => &mut self.min,
            Statistic::Max => &mut self.max,
            Statistic::Mean => &mut self.mean,
            Statistic::Median => &mut self.median,
            Statistic::Std => &mut self.std,
            Statistic::StdPerc => &mut self.std_perc,
            Statistic::LowerQuartile => &mut self.lower_quartile,
            Statistic::UpperQuartile => &mut self.upper_quartile,
            Statistic::LowerWhisker => &mut self.lower_whisker,
            Statistic::UpperWhisker => &mut self.upper_whisker,
        }
    }

    /// Value of a statistic for a metric
    pub fn get(&self, stat: Statistic, metric: &str) -> Option<f64> {
        self.map(stat).get(metric).copied()
    }

    /// All metrics of one statistic
    pub fn statistic(&self, stat: Statistic) -> &BTreeMap<String, f64> {
        self.map(stat)
    }

    /// Outlying runs of a metric, in run order
    pub fn outliers(&self, metric: &str) -> Option<&[f64]> {
        self.outliers.get(metric).map(Vec::as_slice)
    }

    /// Metrics with statistics
    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.mean.keys().map(String::as_str)
    }

    /// Whether no metric was summarized
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Store the summary of one metric
    pub fn insert(&mut self, metric: &str, summary: DescriptiveStatistics) {
        let values = [
            (Statistic::Min, summary.min),
            (Statistic::Max, summary.max),
            (Statistic::Mean, summary.mean),
            (Statistic::Median, summary.median),
            (Statistic::Std, summary.std),
            (Statistic::StdPerc, summary.std_perc),
            (Statistic::LowerQuartile, summary.lower_quartile),
            (Statistic::UpperQuartile, summary.upper_quartile),
            (Statistic::LowerWhisker, summary.lower_whisker),
            (Statistic::UpperWhisker, summary.upper_whisker),
        ];
        for (stat, value) in values {
            self.map_mut(stat).insert(metric.to_string(), value);
        }
        self.outliers.insert(metric.to_string(), summary.outliers);
    }
}

// NaN marks an undefined statistic; two undefined values are equal.
impl PartialEq for StatisticsBundle {
    fn eq(&self, other: &Self) -> bool {
        fn same(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> bool {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && (va == vb || (va.is_nan() && vb.is_nan())))
        }
        Statistic::ALL
            .into_iter()
            .all(|stat| same(self.map(stat), other.map(stat)))
            && self.outliers == other.outliers
    }
}

/// Summarize the runs of one permutation
///
/// Metrics are taken from the first run. A metric that is absent or not
/// numeric in any run is skipped; missing values count as NaN.
pub fn summarize_runs(runs: &[Record], outlier_method: OutlierMethod) -> StatisticsBundle {
    let mut bundle = StatisticsBundle::default();
    let Some(first) = runs.first() else {
        return bundle;
    };

    for metric in first.keys() {
        let samples: Option<Vec<f64>> = runs.iter().map(|run| run.numeric(metric)).collect();
        match samples {
            Some(samples) => bundle.insert(metric, describe(&samples, outlier_method)),
            None => trace!(metric, "Skipping non-numeric metric"),
        }
    }
    bundle
}

/// Recompute the statistics of every allocator and permutation
///
/// Previous statistics are discarded. Allocators without any runs get no
/// statistics table.
pub fn compute_statistics(results: &mut BenchmarkResults, outlier_method: OutlierMethod) {
    let stats: BTreeMap<String, StatisticsTable> = results
        .results
        .par_iter()
        .filter(|(_, table)| !table.is_empty())
        .map(|(allocator, table)| {
            let per_perm: StatisticsTable = table
                .iter()
                .filter(|(_, runs)| !runs.is_empty())
                .map(|(perm, runs)| (perm.clone(), summarize_runs(runs, outlier_method)))
                .collect();
            debug!(
                allocator = %allocator,
                permutations = per_perm.len(),
                "Computed statistics"
            );
            (allocator.clone(), per_perm)
        })
        .collect();

    results.stats = stats;
}

impl BenchmarkResults {
    /// Recompute statistics with the default whisker multiplier
    pub fn compute_statistics(&mut self) {
        compute_statistics(self, OutlierMethod::default());
    }

    /// Statistics of one allocator and permutation
    pub fn statistics(&self, allocator: &str, perm: &Permutation) -> Option<&StatisticsBundle> {
        self.stats.get(allocator).and_then(|table| table.get(perm))
    }

    pub(crate) fn set_stats(&mut self, allocator: String, table: StatisticsTable) {
        self.stats.insert(allocator, table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::AllocatorDescriptor;
    use crate::permutation::ArgumentSpace;
    use crate::record::MetricValue;

    fn runs(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .map(|&v| Record::new().with("x", v))
            .collect()
    }

    #[test]
    fn test_reference_sample() {
        let bundle = summarize_runs(
            &runs(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0]),
            OutlierMethod::default(),
        );
        assert_eq!(bundle.get(Statistic::Min, "x"), Some(1.0));
        assert_eq!(bundle.get(Statistic::Max, "x"), Some(100.0));
        assert_eq!(bundle.get(Statistic::Mean, "x"), Some(16.0));
        assert_eq!(bundle.get(Statistic::Median, "x"), Some(4.5));
        assert_eq!(bundle.get(Statistic::LowerQuartile, "x"), Some(2.75));
        assert_eq!(bundle.get(Statistic::UpperQuartile, "x"), Some(6.25));
        assert_eq!(bundle.outliers("x"), Some(&[100.0][..]));
    }

    #[test]
    fn test_missing_run_poisons_mean() {
        let mut samples = runs(&[1.0, 2.0]);
        samples.push(Record::new().with("x", MetricValue::Missing));
        let bundle = summarize_runs(&samples, OutlierMethod::default());
        assert!(bundle.get(Statistic::Mean, "x").unwrap().is_nan());
    }

    #[test]
    fn test_non_numeric_and_partial_metrics_skipped() {
        let samples = vec![
            Record::new().with("x", 1.0).with("host", "node1").with("y", 1.0),
            Record::new().with("x", 2.0).with("host", "node2"),
        ];
        let bundle = summarize_runs(&samples, OutlierMethod::default());
        assert_eq!(bundle.metrics().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_single_run_has_nan_std() {
        let bundle = summarize_runs(&runs(&[5.0]), OutlierMethod::default());
        assert_eq!(bundle.get(Statistic::Mean, "x"), Some(5.0));
        assert!(bundle.get(Statistic::Std, "x").unwrap().is_nan());
        assert_eq!(bundle.outliers("x"), Some(&[][..]));
    }

    #[test]
    fn test_compute_statistics_skips_empty_allocators() {
        let args = ArgumentSpace::new().with_dimension("n", [1, 2]).unwrap();
        let mut results = BenchmarkResults::new("bench", args);
        results.add_allocator("a", AllocatorDescriptor::default());
        results.add_allocator("b", AllocatorDescriptor::default());
        let perm = results.args().permutations().next().unwrap();
        for v in [1.0, 2.0, 3.0] {
            results
                .record("a", perm.clone(), Record::new().with("x", v))
                .unwrap();
        }

        results.compute_statistics();
        assert!(results.stats_table("b").is_none());
        let bundle = results.statistics("a", &perm).unwrap();
        assert_eq!(bundle.get(Statistic::Mean, "x"), Some(2.0));

        let other = results.args().permutations().nth(1).unwrap();
        assert!(results.statistics("a", &other).is_none());
    }

    #[test]
    fn test_bundle_json_nan_as_null() {
        let bundle = summarize_runs(&runs(&[5.0]), OutlierMethod::default());
        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json["std"]["x"].is_null());
        assert_eq!(json["mean"]["x"], 5.0);

        let back: StatisticsBundle = serde_json::from_value(json).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_statistic_names() {
        for stat in Statistic::ALL {
            assert_eq!(stat.as_str().parse::<Statistic>().unwrap(), stat);
        }
        assert!("variance".parse::<Statistic>().is_err());
    }
}
