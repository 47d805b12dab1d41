//! Cross-run merge
//!
//! Folds the allocators of one results set into another, e.g. when the same
//! benchmark was run for different allocators on separate days. An allocator
//! already present in the destination is never overwritten.

use crate::persistence::PersistError;
use crate::results::BenchmarkResults;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from merging results
#[derive(Debug, Error)]
pub enum MergeError {
    /// Source and destination are results of different benchmarks.
    #[error("Cannot merge results of '{src}' into '{dest}'")]
    BenchmarkMismatch {
        /// Destination benchmark
        dest: String,
        /// Source benchmark
        src: String,
    },

    /// Source and destination were measured over different argument spaces.
    #[error("Argument spaces of '{0}' differ between source and destination")]
    IncompatibleArguments(String),

    /// Loading or saving failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// What a merge did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Allocators copied into the destination
    pub merged: Vec<String>,
    /// Allocators skipped because the destination already had them
    pub conflicts: Vec<String>,
}

impl MergeReport {
    /// Whether the destination changed
    pub fn changed(&self) -> bool {
        !self.merged.is_empty()
    }
}

/// Copy every allocator of `src` that `dest` does not have
///
/// Descriptor, runs and statistics of an allocator move together. Conflicts
/// are logged and reported, never resolved.
pub fn merge(dest: &mut BenchmarkResults, src: &BenchmarkResults) -> Result<MergeReport, MergeError> {
    if dest.name != src.name {
        return Err(MergeError::BenchmarkMismatch {
            dest: dest.name.clone(),
            src: src.name.clone(),
        });
    }
    if dest.args != src.args {
        return Err(MergeError::IncompatibleArguments(dest.name.clone()));
    }

    let mut report = MergeReport::default();
    for (allocator, descriptor) in &src.allocators {
        if dest.allocators.contains_key(allocator) {
            warn!(
                benchmark = %dest.name,
                allocator = %allocator,
                "Allocator already in destination, skipping"
            );
            report.conflicts.push(allocator.clone());
            continue;
        }

        dest.allocators.insert(allocator.clone(), descriptor.clone());
        dest.results.insert(
            allocator.clone(),
            src.results.get(allocator).cloned().unwrap_or_default(),
        );
        match src.stats.get(allocator) {
            Some(stats) => {
                dest.stats.insert(allocator.clone(), stats.clone());
            }
            None => {
                dest.stats.remove(allocator);
            }
        }
        debug!(benchmark = %dest.name, allocator = %allocator, "Merged allocator");
        report.merged.push(allocator.clone());
    }
    Ok(report)
}

/// Merge the results saved at `src` into those saved at `dest`
///
/// `dest` is rewritten only when at least one allocator was copied.
pub fn merge_files(src: &Path, dest: &Path) -> Result<MergeReport, MergeError> {
    let src_results = BenchmarkResults::load_file(src)?;
    let dest_path: PathBuf = crate::persistence::resolve_path(dest, src_results.name());
    let mut dest_results = BenchmarkResults::load_file(&dest_path)?;

    let report = merge(&mut dest_results, &src_results)?;
    if report.changed() {
        dest_results.save(&dest_path)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::AllocatorDescriptor;
    use crate::permutation::ArgumentSpace;
    use crate::record::Record;

    fn results(allocators: &[(&str, f64)]) -> BenchmarkResults {
        let args = ArgumentSpace::new().with_dimension("n", [1, 2]).unwrap();
        let mut results = BenchmarkResults::new("bench", args);
        let perm = results.args().permutations().next().unwrap();
        for &(name, ops) in allocators {
            results.add_allocator(name, AllocatorDescriptor::default());
            results
                .record(name, perm.clone(), Record::new().with("ops", ops))
                .unwrap();
        }
        results.compute_statistics();
        results
    }

    #[test]
    fn test_merge_disjoint() {
        let mut dest = results(&[("glibc", 1.0)]);
        let src = results(&[("jemalloc", 2.0)]);

        let report = merge(&mut dest, &src).unwrap();
        assert_eq!(report.merged, vec!["jemalloc"]);
        assert!(report.conflicts.is_empty());

        assert_eq!(dest.allocator_names().collect::<Vec<_>>(), vec!["glibc", "jemalloc"]);
        assert_eq!(dest.table("jemalloc"), src.table("jemalloc"));
        assert_eq!(dest.stats_table("jemalloc"), src.stats_table("jemalloc"));
    }

    #[test]
    fn test_conflict_keeps_destination() {
        let mut dest = results(&[("glibc", 1.0)]);
        let before = dest.clone();
        let src = results(&[("glibc", 99.0)]);

        let report = merge(&mut dest, &src).unwrap();
        assert!(report.merged.is_empty());
        assert_eq!(report.conflicts, vec!["glibc"]);
        assert_eq!(dest, before);
    }

    #[test]
    fn test_incompatible_arguments() {
        let mut dest = results(&[("glibc", 1.0)]);
        let args = ArgumentSpace::new().with_dimension("n", [1, 2, 3]).unwrap();
        let src = BenchmarkResults::new("bench", args);
        assert!(matches!(
            merge(&mut dest, &src),
            Err(MergeError::IncompatibleArguments(_))
        ));
    }

    #[test]
    fn test_benchmark_mismatch() {
        let mut dest = results(&[]);
        let src = BenchmarkResults::new("other", ArgumentSpace::new());
        assert!(matches!(
            merge(&mut dest, &src),
            Err(MergeError::BenchmarkMismatch { .. })
        ));
    }

    #[test]
    fn test_merge_files_only_saves_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = dir.path().join("src");
        let dest_dir = dir.path().join("dest");
        std::fs::create_dir_all(&src_dir).unwrap();
        std::fs::create_dir_all(&dest_dir).unwrap();

        let src_path = results(&[("jemalloc", 2.0)]).save(&src_dir).unwrap();
        results(&[("glibc", 1.0)]).save(&dest_dir).unwrap();

        let report = merge_files(&src_path, &dest_dir).unwrap();
        assert_eq!(report.merged, vec!["jemalloc"]);
        let merged = BenchmarkResults::load(&dest_dir, "bench").unwrap();
        assert_eq!(merged.allocators().len(), 2);

        let report = merge_files(&src_path, &dest_dir).unwrap();
        assert!(!report.changed());
        assert_eq!(report.conflicts, vec!["jemalloc"]);
    }

    #[test]
    fn test_merge_files_missing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = results(&[("jemalloc", 2.0)]).save(dir.path()).unwrap();
        let missing = dir.path().join("missing");
        std::fs::create_dir_all(&missing).unwrap();

        match merge_files(&src_path, &missing) {
            Err(MergeError::Persist(e)) => assert!(e.is_not_found()),
            other => panic!("expected not found, got {:?}", other),
        }
    }
}
