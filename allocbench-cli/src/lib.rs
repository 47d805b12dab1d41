#![warn(missing_docs)]
//! allocbench CLI Library
//!
//! Command line tooling around saved allocbench results: merging result
//! directories of independent sessions, summarizing and exporting their
//! statistics, and comparing two allocators.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     allocbench_cli::run()
//! }
//! ```

mod commands;
mod config;
mod planner;

pub use commands::*;
pub use config::*;
pub use planner::{BenchmarkFile, FACTS_FILE_STEM, Plan, build_plan, discover_results};

use allocbench_logic::DerivedMetric;
use allocbench_report::OutputFormat;
use allocbench_stats::ComparisonConfig;
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::PathBuf;

/// allocbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "allocbench")]
#[command(author, version, about = "allocbench - memory allocator benchmark results")]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads for parallel statistics computation
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (default: discover allocbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the results of one session into another
    Merge {
        /// Results directory to merge from
        src: PathBuf,
        /// Results directory to merge into
        dest: PathBuf,
        /// Only merge these benchmarks
        #[arg(short = 'b', long, num_args = 1..)]
        benchmarks: Vec<String>,
        /// Do not merge these benchmarks
        #[arg(short = 'x', long, num_args = 1..)]
        exclude: Vec<String>,
    },
    /// Summarize saved results
    Summarize {
        /// Results directory
        results: PathBuf,
        /// Only summarize these benchmarks
        #[arg(short = 'b', long, num_args = 1..)]
        benchmarks: Vec<String>,
        /// Do not summarize these benchmarks
        #[arg(short = 'x', long, num_args = 1..)]
        exclude: Vec<String>,
        /// Output format: human, json, csv, dataref
        #[arg(long)]
        format: Option<String>,
        /// Output file for human/json output, directory for csv/dataref
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Metric to export (repeatable; default: all)
        #[arg(long = "metric")]
        metrics: Vec<String>,
        /// Leaderboard datapoint, e.g. "{ops}/{task-clock}" or "<{VmHWM}"
        #[arg(long = "leaderboard")]
        leaderboards: Vec<String>,
        /// Derived metric as "name=expression"
        #[arg(long)]
        derived: Vec<String>,
        /// Whisker distance from the quartiles in IQRs
        #[arg(long)]
        whisker_multiplier: Option<f64>,
        /// Repair failed runs and recompute statistics
        #[arg(long)]
        recompute: bool,
    },
    /// Compare two allocators on one metric
    Compare {
        /// Results directory
        results: PathBuf,
        /// Benchmark name
        benchmark: String,
        /// Reference allocator
        baseline: String,
        /// Allocator under evaluation
        candidate: String,
        /// Metric to compare
        #[arg(long, default_value = "task-clock")]
        metric: String,
        /// Bootstrap iterations
        #[arg(long)]
        bootstrap_iterations: Option<usize>,
    },
    /// Print the facts of saved results
    Facts {
        /// Results directory
        results: PathBuf,
        /// Only these benchmarks
        #[arg(short = 'b', long, num_args = 1..)]
        benchmarks: Vec<String>,
        /// Line prefix
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Print a default allocbench.toml
    Init,
}

/// Run the allocbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the allocbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("allocbench=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("allocbench=info")
            .with_writer(std::io::stderr)
            .init();
    }

    // Configuration file, CLI flags override it
    let config = match &cli.config {
        Some(path) => AllocbenchConfig::load(path)
            .map_err(|e| anyhow::anyhow!("Cannot load {}: {}", path.display(), e))?,
        None => AllocbenchConfig::discover().unwrap_or_default(),
    };

    // Configure Rayon thread pool for statistics computation
    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    match cli.command {
        Commands::Merge {
            ref src,
            ref dest,
            ref benchmarks,
            ref exclude,
        } => {
            let include = if benchmarks.is_empty() {
                &config.merge.benchmarks
            } else {
                benchmarks
            };
            let exclude = if exclude.is_empty() {
                &config.merge.exclude
            } else {
                exclude
            };
            for outcome in merge_directories(src, dest, include, exclude)? {
                println!("{}", outcome);
            }
        }
        Commands::Summarize {
            ref results,
            ref benchmarks,
            ref exclude,
            ref format,
            ref output,
            ref metrics,
            ref leaderboards,
            ref derived,
            whisker_multiplier,
            recompute,
        } => {
            let format: OutputFormat = format
                .as_deref()
                .unwrap_or(&config.output.format)
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            let mut statistics = config.statistics.clone();
            if let Some(k) = whisker_multiplier {
                statistics.whisker_multiplier = k;
            }

            let exports_files = matches!(format, OutputFormat::Csv | OutputFormat::Dataref);
            let output_dir = match output {
                Some(path) if exports_files => path.clone(),
                _ => PathBuf::from(&config.output.directory),
            };

            let options = SummarizeOptions {
                include: benchmarks.clone(),
                exclude: exclude.clone(),
                format,
                output_dir,
                metrics: metrics.clone(),
                leaderboards: leaderboards
                    .iter()
                    .map(|spec| parse_leaderboard_spec(spec))
                    .collect::<anyhow::Result<_>>()?,
                derived: derived
                    .iter()
                    .map(|spec| spec.parse::<DerivedMetric>())
                    .collect::<Result<_, _>>()
                    .map_err(|e| anyhow::anyhow!("Invalid derived metric: {}", e))?,
                // A changed whisker multiplier invalidates the saved outliers
                recompute: recompute || whisker_multiplier.is_some(),
                outlier_method: statistics.outlier_method(),
            };

            let text = summarize(results, &options)?;
            match output {
                Some(path) if !exports_files => {
                    let mut file = std::fs::File::create(path)?;
                    file.write_all(text.as_bytes())?;
                    println!("Report written to: {}", path.display());
                }
                _ => print!("{}", text),
            }
        }
        Commands::Compare {
            ref results,
            ref benchmark,
            ref baseline,
            ref candidate,
            ref metric,
            bootstrap_iterations,
        } => {
            let comparison = ComparisonConfig {
                bootstrap_iterations: bootstrap_iterations
                    .unwrap_or(config.statistics.bootstrap_iterations),
                outlier_method: config.statistics.outlier_method(),
            };
            let request = CompareRequest {
                benchmark,
                baseline,
                candidate,
                metric,
            };
            print!("{}", compare(results, &request, &comparison)?);
        }
        Commands::Facts {
            ref results,
            ref benchmarks,
            ref comment,
        } => {
            print!("{}", print_facts(results, benchmarks, &[], comment)?);
        }
        Commands::Init => {
            print!("{}", AllocbenchConfig::default_toml());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_merge() {
        let cli = Cli::try_parse_from([
            "allocbench",
            "merge",
            "results/a",
            "results/b",
            "-x",
            "mysql",
            "larson",
        ])
        .unwrap();
        match cli.command {
            Commands::Merge {
                src,
                dest,
                benchmarks,
                exclude,
            } => {
                assert_eq!(src, PathBuf::from("results/a"));
                assert_eq!(dest, PathBuf::from("results/b"));
                assert!(benchmarks.is_empty());
                assert_eq!(exclude, vec!["mysql", "larson"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_summarize_with_global_flags() {
        let cli = Cli::try_parse_from([
            "allocbench",
            "summarize",
            "results",
            "--format",
            "csv",
            "--metric",
            "ops",
            "--leaderboard",
            "<{VmHWM}",
            "-v",
            "-j",
            "2",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.threads, 2);
        match cli.command {
            Commands::Summarize {
                format,
                metrics,
                leaderboards,
                recompute,
                ..
            } => {
                assert_eq!(format.as_deref(), Some("csv"));
                assert_eq!(metrics, vec!["ops"]);
                assert_eq!(leaderboards, vec!["<{VmHWM}"]);
                assert!(!recompute);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
