//! Subcommand implementations

mod compare;
mod facts;
mod formatting;
mod merge;
mod summarize;

pub use compare::{CompareRequest, compare};
pub use facts::print_facts;
pub use formatting::{format_comparison_output, format_human_output};
pub use merge::{BenchmarkMerge, MergeOutcome, merge_directories};
pub use summarize::{SummarizeOptions, load_benchmarks, parse_leaderboard_spec, summarize};
