#![warn(missing_docs)]
//! # allocbench
//!
//! Compare memory allocators across workloads.
//!
//! Benchmarks run every workload once per allocator, argument permutation
//! and repetition. This crate turns those raw runs into something to compare:
//! - **Permutation Space**: typed argument dimensions enumerated in a fixed order
//! - **Result Store**: runs kept per allocator and permutation in run order
//! - **Repair**: failed runs become NaN-filled records instead of aborting
//! - **Statistics**: min/max/mean/median/std, quartiles, whiskers and outliers
//! - **Persistence**: one JSON blob per benchmark
//! - **Merge**: combine sessions that covered disjoint allocators
//! - **Reports**: leaderboards, CSV and dataref export, allocator comparison
//!
//! ## Quick Start
//!
//! ```ignore
//! use allocbench::prelude::*;
//!
//! let args = ArgumentSpace::new().with_dimension("threads", [1, 2, 4])?;
//! let mut results = BenchmarkResults::new("loop", args);
//! results.add_allocator("glibc", AllocatorDescriptor::default());
//!
//! for perm in results.args().permutations().collect::<Vec<_>>() {
//!     results.record("glibc", perm, Record::new().with("task-clock", 12.5))?;
//! }
//! results.repair_failures();
//! results.compute_statistics();
//! results.save("results/")?;
//! ```

// Re-export core types
pub use allocbench_core::{
    AllocatorDescriptor, ArgValue, ArgumentSpace, BenchmarkResults, Dimension, Facts, MergeError,
    MergeReport, MetricValue, OutlierMethod, Permutation, PermutationError, PersistError, Record,
    ResultTable, ResultsError, Statistic, StatisticsBundle, compute_statistics, expand_failures,
    find_template, merge, merge_files,
};

// Re-export logic types
pub use allocbench_logic::{DerivedMetric, Expr, ExprError, MetricContext};

// Re-export stats
pub use allocbench_stats::{
    ComparisonConfig, ComparisonResult, DescriptiveStatistics, compare_distributions, describe,
};

// Re-export reports
pub use allocbench_report::{
    Leaderboard, Order, OutputFormat, SystemInfo, compare_allocators, evaluate_datapoint,
    leaderboard, write_csv, write_dataref,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AllocatorDescriptor, ArgumentSpace, BenchmarkResults, Expr, MetricValue, Permutation,
        Record, Statistic,
    };
}

/// Run the allocbench CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     allocbench::run()
/// }
/// ```
pub use allocbench_cli::run;
