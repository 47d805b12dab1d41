//! Summaries
//!
//! Loads the saved benchmarks of a results directory and renders them as a
//! terminal summary, a JSON report, or per-metric CSV/dataref files.

use super::formatting::format_human_output;
use crate::planner;
use allocbench_core::{BenchmarkResults, OutlierMethod, compute_statistics};
use allocbench_logic::{DerivedMetric, Expr};
use allocbench_report::{
    Leaderboard, Order, OutputFormat, SystemInfo, build_report, format_leaderboards,
    generate_json_report, leaderboard, write_csv, write_dataref,
};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to summarize and how
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Only these benchmarks (empty = all)
    pub include: Vec<String>,
    /// Never these benchmarks
    pub exclude: Vec<String>,
    /// Output format
    pub format: OutputFormat,
    /// Directory for exported files
    pub output_dir: PathBuf,
    /// Metrics to export (empty = every metric with statistics)
    pub metrics: Vec<String>,
    /// Datapoints to rank allocators by
    pub leaderboards: Vec<(Expr, Order)>,
    /// Derived metrics shown in human and JSON output
    pub derived: Vec<DerivedMetric>,
    /// Repair failed runs and recompute statistics before reporting
    pub recompute: bool,
    /// Outlier rule when recomputing
    pub outlier_method: OutlierMethod,
}

/// Parse a leaderboard spec: an optional `>` or `<` followed by a datapoint
///
/// Without a prefix larger values rank first.
pub fn parse_leaderboard_spec(spec: &str) -> anyhow::Result<(Expr, Order)> {
    let spec = spec.trim();
    let (order, expr) = if let Some(rest) = spec.strip_prefix('<') {
        (Order::Ascending, rest)
    } else {
        (Order::Descending, spec.strip_prefix('>').unwrap_or(spec))
    };
    let expr = Expr::parse(expr)
        .map_err(|e| anyhow::anyhow!("Invalid leaderboard datapoint '{}': {}", expr, e))?;
    Ok((expr, order))
}

/// Load the selected benchmarks of a results directory
pub fn load_benchmarks(
    dir: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<BenchmarkResults>> {
    let files = planner::discover_results(dir)
        .map_err(|e| anyhow::anyhow!("Cannot read results directory {}: {}", dir.display(), e))?;
    let plan = planner::build_plan(files, include, exclude);

    plan.benchmarks
        .iter()
        .map(|file| {
            BenchmarkResults::load_file(&file.path)
                .map_err(|e| anyhow::anyhow!("Cannot load {}: {}", file.name, e))
        })
        .collect()
}

fn metrics_of(results: &BenchmarkResults) -> BTreeSet<String> {
    results
        .stats()
        .values()
        .flat_map(|table| table.values())
        .flat_map(|bundle| bundle.metrics().map(str::to_string))
        .collect()
}

fn export_files(
    benchmarks: &[BenchmarkResults],
    options: &SummarizeOptions,
    system: &SystemInfo,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&options.output_dir)?;
    let mut written = Vec::new();

    for results in benchmarks {
        let metrics: Vec<String> = if options.metrics.is_empty() {
            metrics_of(results).into_iter().collect()
        } else {
            options.metrics.clone()
        };

        for metric in metrics {
            let path = options.output_dir.join(format!(
                "{}.{}.{}",
                results.name(),
                metric,
                options.format.extension()
            ));
            let mut out = BufWriter::new(File::create(&path)?);
            match options.format {
                OutputFormat::Csv => write_csv(&mut out, results, &metric)?,
                _ => write_dataref(&mut out, results, &metric, Some(system))?,
            }
            out.flush()?;
            debug!(path = %path.display(), "Exported statistics");
            written.push(path);
        }
    }
    Ok(written)
}

/// Summarize a results directory; returns the text to print
pub fn summarize(dir: &Path, options: &SummarizeOptions) -> anyhow::Result<String> {
    let mut benchmarks = load_benchmarks(dir, &options.include, &options.exclude)?;
    info!(count = benchmarks.len(), dir = %dir.display(), "Loaded benchmarks");

    if options.recompute {
        for results in &mut benchmarks {
            let repaired = results.repair_failures();
            if repaired > 0 {
                info!(benchmark = results.name(), repaired, "Repaired failed runs");
            }
            compute_statistics(results, options.outlier_method);
        }
    }

    let system = SystemInfo::collect();
    match options.format {
        OutputFormat::Human => {
            let report = build_report(&benchmarks, &options.derived, system);
            let mut output = format_human_output(&report);
            let boards: Vec<Leaderboard> = benchmarks
                .iter()
                .flat_map(|results| {
                    options
                        .leaderboards
                        .iter()
                        .map(move |(expr, order)| leaderboard(results, expr, *order))
                })
                .collect();
            if !boards.is_empty() {
                output.push_str(&format_leaderboards(&boards));
            }
            Ok(output)
        }
        OutputFormat::Json => {
            let report = build_report(&benchmarks, &options.derived, system);
            Ok(generate_json_report(&report)?)
        }
        OutputFormat::Csv | OutputFormat::Dataref => {
            let written = export_files(&benchmarks, options, &system)?;
            let mut output = String::new();
            for path in written {
                output.push_str(&format!("wrote {}\n", path.display()));
            }
            Ok(output)
        }
    }
}
