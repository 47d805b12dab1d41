#![warn(missing_docs)]
//! allocbench Core - Result Aggregation
//!
//! This crate holds everything measured for one benchmark:
//! - Argument space and its permutations
//! - Raw per-run records keyed by allocator and permutation
//! - Repair of failed runs before statistics
//! - Per-permutation descriptive statistics
//! - JSON persistence and cross-run merging

mod allocator;
mod float;
mod merge;
mod permutation;
mod persistence;
mod record;
mod repair;
mod results;
mod statistics;

pub use allocator::AllocatorDescriptor;
pub use merge::{MergeError, MergeReport, merge, merge_files};
pub use permutation::{ArgValue, ArgumentSpace, Dimension, Permutation, PermutationError, Permutations};
pub use persistence::{
    PersistError, RESULTS_EXTENSION, SavedEntry, SavedResults, deserialize, resolve_path, serialize,
};
pub use record::{MetricValue, Record};
pub use repair::{expand_failures, find_template};
pub use results::{BenchmarkResults, Facts, ResultTable, ResultsError};
pub use statistics::{
    Statistic, StatisticsBundle, StatisticsTable, compute_statistics, summarize_runs,
};

pub use allocbench_stats::OutlierMethod;
