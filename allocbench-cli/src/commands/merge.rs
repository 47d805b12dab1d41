//! Directory merge
//!
//! Merges every saved benchmark of a source results directory into the
//! matching file of a destination directory. Each benchmark is handled on its
//! own: a missing or broken file is reported and the rest still merge.

use crate::planner::{self, BenchmarkFile};
use allocbench_core::{MergeError, MergeReport, RESULTS_EXTENSION, merge_files};
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

/// What happened to one benchmark
#[derive(Debug)]
pub enum MergeOutcome {
    /// Merge ran; the report lists copied and conflicting allocators
    Merged(MergeReport),
    /// The destination has no results for this benchmark
    MissingDestination,
    /// A results file vanished between discovery and loading
    NotFound,
    /// The merge failed, e.g. on malformed results
    Failed(MergeError),
}

/// Merge outcome of one benchmark
#[derive(Debug)]
pub struct BenchmarkMerge {
    /// Benchmark name
    pub name: String,
    /// Outcome
    pub outcome: MergeOutcome,
}

impl fmt::Display for BenchmarkMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            MergeOutcome::Merged(report) if report.changed() => write!(
                f,
                "{}: merged {}",
                self.name,
                report.merged.join(", ")
            )?,
            MergeOutcome::Merged(_) => write!(f, "{}: nothing to merge", self.name)?,
            MergeOutcome::MissingDestination => {
                write!(f, "{}: skipped, no destination results", self.name)?
            }
            MergeOutcome::NotFound => write!(f, "{}: skipped, results not found", self.name)?,
            MergeOutcome::Failed(e) => write!(f, "{}: failed: {}", self.name, e)?,
        }
        if let MergeOutcome::Merged(report) = &self.outcome {
            if !report.conflicts.is_empty() {
                write!(f, " (already present: {})", report.conflicts.join(", "))?;
            }
        }
        Ok(())
    }
}

fn merge_one(file: &BenchmarkFile, dest_dir: &Path) -> MergeOutcome {
    let dest = dest_dir.join(format!("{}.{}", file.name, RESULTS_EXTENSION));
    if !dest.is_file() {
        warn!(benchmark = %file.name, dest = %dest.display(), "No destination results, skipping");
        return MergeOutcome::MissingDestination;
    }

    match merge_files(&file.path, &dest) {
        Ok(report) => {
            info!(
                benchmark = %file.name,
                merged = report.merged.len(),
                conflicts = report.conflicts.len(),
                "Merged results"
            );
            MergeOutcome::Merged(report)
        }
        Err(MergeError::Persist(e)) if e.is_not_found() => {
            warn!(benchmark = %file.name, "{}", e);
            MergeOutcome::NotFound
        }
        Err(e) => {
            error!(benchmark = %file.name, "Merge failed: {}", e);
            MergeOutcome::Failed(e)
        }
    }
}

/// Merge the results in `src_dir` into `dest_dir`
///
/// `include` and `exclude` select benchmarks by name; an empty `include`
/// selects all. Only I/O errors on the source directory itself abort.
pub fn merge_directories(
    src_dir: &Path,
    dest_dir: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<BenchmarkMerge>> {
    let files = planner::discover_results(src_dir).map_err(|e| {
        anyhow::anyhow!("Cannot read results directory {}: {}", src_dir.display(), e)
    })?;
    let plan = planner::build_plan(files, include, exclude);

    Ok(plan
        .benchmarks
        .into_iter()
        .map(|file| {
            let outcome = merge_one(&file, dest_dir);
            BenchmarkMerge {
                name: file.name,
                outcome,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocbench_core::{AllocatorDescriptor, ArgumentSpace, BenchmarkResults, Record};

    fn save(dir: &Path, bench: &str, allocator: &str) {
        let args = ArgumentSpace::new().with_dimension("n", [1]).unwrap();
        let mut results = BenchmarkResults::new(bench, args);
        results.add_allocator(allocator, AllocatorDescriptor::default());
        let perm = results.args().permutations().next().unwrap();
        results
            .record(allocator, perm, Record::new().with("ops", 1.0))
            .unwrap();
        results.compute_statistics();
        results.save(dir).unwrap();
    }

    #[test]
    fn test_directory_merge() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("src");
        let dest = root.path().join("dest");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dest).unwrap();

        save(&src, "loop", "jemalloc");
        save(&src, "larson", "jemalloc");
        save(&src, "mysql", "jemalloc");
        std::fs::write(src.join("facts.json"), "{}").unwrap();
        std::fs::write(src.join("broken.json"), "[").unwrap();
        std::fs::write(dest.join("broken.json"), "[").unwrap();
        save(&dest, "loop", "glibc");
        save(&dest, "mysql", "glibc");

        let outcomes =
            merge_directories(&src, &dest, &[], &["mysql".to_string()]).unwrap();
        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["broken", "larson", "loop"]);

        assert!(matches!(outcomes[0].outcome, MergeOutcome::Failed(_)));
        assert!(matches!(outcomes[1].outcome, MergeOutcome::MissingDestination));
        match &outcomes[2].outcome {
            MergeOutcome::Merged(report) => assert_eq!(report.merged, vec!["jemalloc"]),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(outcomes[2].to_string(), "loop: merged jemalloc");

        let merged = BenchmarkResults::load(&dest, "loop").unwrap();
        assert_eq!(merged.allocator_names().collect::<Vec<_>>(), vec!["glibc", "jemalloc"]);
        let untouched = BenchmarkResults::load(&dest, "mysql").unwrap();
        assert_eq!(untouched.allocators().len(), 1);
    }

    #[test]
    fn test_missing_source_directory() {
        let root = tempfile::tempdir().unwrap();
        assert!(merge_directories(&root.path().join("nope"), root.path(), &[], &[]).is_err());
    }
}
