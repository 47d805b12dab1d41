//! Benchmark Planner
//!
//! Finds the saved benchmarks of a results directory and selects the ones a
//! command should process.
//!
//! Filtering options:
//! - Inclusion list of benchmark names (empty = all)
//! - Exclusion list of benchmark names
//!
//! Ordering: Benchmarks are sorted alphabetically by name for deterministic output.

use allocbench_core::RESULTS_EXTENSION;
use std::path::{Path, PathBuf};

/// Saved file of the host facts, not a benchmark
pub const FACTS_FILE_STEM: &str = "facts";

/// One saved benchmark in a results directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkFile {
    /// Benchmark name (file stem)
    pub name: String,
    /// Path of the saved results
    pub path: PathBuf,
}

/// Selected benchmarks in processing order
#[derive(Debug, Default)]
pub struct Plan {
    /// Ordered list of benchmarks to process
    pub benchmarks: Vec<BenchmarkFile>,
}

/// List the saved benchmarks of a results directory
pub fn discover_results(dir: &Path) -> std::io::Result<Vec<BenchmarkFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(RESULTS_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if name == FACTS_FILE_STEM {
            continue;
        }
        files.push(BenchmarkFile {
            name: name.to_string(),
            path: path.clone(),
        });
    }
    Ok(files)
}

/// Build a plan from discovered benchmarks
///
/// Filters benchmarks by name and returns them in deterministic order.
pub fn build_plan(
    benchmarks: impl IntoIterator<Item = BenchmarkFile>,
    include: &[String],
    exclude: &[String],
) -> Plan {
    let mut selected: Vec<_> = benchmarks
        .into_iter()
        .filter(|b| include.is_empty() || include.contains(&b.name))
        .filter(|b| !exclude.contains(&b.name))
        .collect();

    selected.sort_by(|a, b| a.name.cmp(&b.name));

    Plan {
        benchmarks: selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench(name: &str) -> BenchmarkFile {
        BenchmarkFile {
            name: name.to_string(),
            path: PathBuf::from(format!("{}.json", name)),
        }
    }

    fn names(plan: &Plan) -> Vec<&str> {
        plan.benchmarks.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_no_filter() {
        let plan = build_plan([bench("mysql"), bench("falsesharing"), bench("loop")], &[], &[]);
        assert_eq!(names(&plan), vec!["falsesharing", "loop", "mysql"]);
    }

    #[test]
    fn test_include_filter() {
        let plan = build_plan(
            [bench("mysql"), bench("loop"), bench("larson")],
            &["loop".to_string(), "larson".to_string()],
            &[],
        );
        assert_eq!(names(&plan), vec!["larson", "loop"]);
    }

    #[test]
    fn test_exclude_wins() {
        let plan = build_plan(
            [bench("mysql"), bench("loop")],
            &["loop".to_string(), "mysql".to_string()],
            &["mysql".to_string()],
        );
        assert_eq!(names(&plan), vec!["loop"]);
    }

    #[test]
    fn test_discover_skips_facts_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["loop.json", "facts.json", "notes.txt"] {
            std::fs::write(dir.path().join(file), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("plots.json")).unwrap();

        let found = discover_results(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "loop");
        assert_eq!(found[0].path, dir.path().join("loop.json"));
    }
}
