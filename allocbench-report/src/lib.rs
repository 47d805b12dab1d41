#![warn(missing_docs)]
//! allocbench Report - Consumers of finalized results
//!
//! Everything that reads a benchmark after its statistics are computed:
//! - Datapoint expressions evaluated over a statistic, optionally scaled
//! - Leaderboards per permutation
//! - CSV and dataref export of one metric
//! - Facts blocks and host information
//! - Allocator colors and pairwise allocator comparison
//! - JSON summary reports

mod color;
mod comparison;
mod datapoint;
mod export;
mod facts;
mod json;
mod leaderboard;
mod report;

pub use color::{PALETTE_SIZE, allocator_colors, assign_colors};
pub use comparison::{PermutationComparison, compare_allocators, metric_samples};
pub use datapoint::{datapoint_series, evaluate_datapoint};
pub use export::{write_csv, write_dataref};
pub use facts::{FactsOptions, SystemInfo, write_facts};
pub use json::generate_json_report;
pub use leaderboard::{Leaderboard, Order, Placement, format_leaderboards, leaderboard, rank_permutation};
pub use report::{
    BenchmarkReport, DatapointReport, MetricSummary, Report, ReportMeta, build_benchmark_report,
    build_report,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Human,
    /// JSON summary report
    Json,
    /// CSV statistics of one metric
    Csv,
    /// LaTeX dataref definitions of one metric
    Dataref,
}

impl OutputFormat {
    /// File extension for exported files
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Human => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Dataref => "dataref",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "dataref" | "tex" => Ok(OutputFormat::Dataref),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("tex".parse::<OutputFormat>().unwrap(), OutputFormat::Dataref);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
