//! Persistence
//!
//! Results are saved as one JSON document per benchmark. Permutations cannot
//! be JSON object keys, so every per-permutation table is written as a list
//! of `[{"threads": 4, "size": 64}, value]` pairs in canonical permutation
//! order. Loading rebuilds the keyed tables against the saved argument space.

use crate::allocator::AllocatorDescriptor;
use crate::permutation::{ArgValue, ArgumentSpace, PermutationError};
use crate::record::Record;
use crate::results::{BenchmarkResults, Facts};
use crate::statistics::{StatisticsBundle, StatisticsTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// File extension of saved results
pub const RESULTS_EXTENSION: &str = "json";

/// Errors from saving or loading results
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
    /// No saved results at the given location.
    #[error("No saved results at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not a valid results document.
    #[error("Malformed results in {}: {source}", path.display())]
    Malformed {
        /// File that failed to parse
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A saved permutation does not fit the saved argument space.
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(#[from] PermutationError),

    /// Results or statistics reference an allocator without a descriptor.
    #[error("Results reference undeclared allocator '{0}'")]
    UndeclaredAllocator(String),
}

impl PersistError {
    /// Whether the error means "nothing saved here"
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistError::NotFound(_))
    }
}

/// One entry of a per-permutation table
pub type SavedEntry<T> = (BTreeMap<String, ArgValue>, T);

/// Saved form of [`BenchmarkResults`]; every map key is a plain string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResults {
    /// Benchmark name
    pub name: String,
    /// Argument dimensions in canonical order
    pub args: ArgumentSpace,
    /// Allocator descriptors
    #[serde(default)]
    pub allocators: BTreeMap<String, AllocatorDescriptor>,
    /// Runs per allocator
    #[serde(default)]
    pub results: BTreeMap<String, Vec<SavedEntry<Vec<Record>>>>,
    /// Statistics per allocator; recomputed on load when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<BTreeMap<String, Vec<SavedEntry<StatisticsBundle>>>>,
    /// Facts about the run
    #[serde(default)]
    pub facts: Facts,
}

/// Convert results into their saved form
///
/// Allocators without any recorded run are left out of the result and
/// statistics lists; their descriptors are kept.
pub fn serialize(results: &BenchmarkResults) -> SavedResults {
    let perms: Vec<_> = results.args.permutations().collect();

    let saved_results = results
        .results
        .iter()
        .filter(|(_, table)| !table.is_empty())
        .map(|(allocator, table)| {
            let entries = perms
                .iter()
                .filter(|perm| table.contains(perm))
                .map(|perm| (perm.to_map(), table.get(perm).to_vec()))
                .collect();
            (allocator.clone(), entries)
        })
        .collect();

    let saved_stats = results
        .stats
        .iter()
        .map(|(allocator, table)| {
            let entries = perms
                .iter()
                .filter_map(|perm| table.get(perm).map(|bundle| (perm.to_map(), bundle.clone())))
                .collect();
            (allocator.clone(), entries)
        })
        .collect();

    SavedResults {
        name: results.name.clone(),
        args: results.args.clone(),
        allocators: results.allocators.clone(),
        results: saved_results,
        stats: Some(saved_stats),
        facts: results.facts.clone(),
    }
}

/// Rebuild results from their saved form
///
/// When the document carries no statistics they are recomputed.
pub fn deserialize(saved: SavedResults) -> Result<BenchmarkResults, PersistError> {
    let mut results = BenchmarkResults::new(saved.name, saved.args);
    results.facts = saved.facts;
    for (name, descriptor) in saved.allocators {
        results.add_allocator(name, descriptor);
    }

    for (allocator, entries) in saved.results {
        let table = results
            .results
            .get_mut(&allocator)
            .ok_or_else(|| PersistError::UndeclaredAllocator(allocator.clone()))?;
        for (map, runs) in entries {
            let perm = results.args.permutation(map)?;
            for run in runs {
                table.append(perm.clone(), run);
            }
        }
    }

    match saved.stats {
        Some(stats) => {
            for (allocator, entries) in stats {
                if !results.allocators.contains_key(&allocator) {
                    return Err(PersistError::UndeclaredAllocator(allocator));
                }
                let table = entries
                    .into_iter()
                    .map(|(map, bundle)| Ok((results.args.permutation(map)?, bundle)))
                    .collect::<Result<StatisticsTable, PersistError>>()?;
                results.set_stats(allocator, table);
            }
        }
        None => {
            info!(benchmark = %results.name, "No statistics saved, recomputing");
            results.compute_statistics();
        }
    }

    Ok(results)
}

/// Where results of `name` live: `path` itself, or `{name}.json` inside it
/// when `path` is a directory
pub fn resolve_path(path: &Path, name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(format!("{}.{}", name, RESULTS_EXTENSION))
    } else {
        path.to_path_buf()
    }
}

impl BenchmarkResults {
    /// Save to `path`, or to `{name}.json` inside it if it is a directory
    ///
    /// Returns the file written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, PersistError> {
        let path = resolve_path(path.as_ref(), &self.name);
        let io_err = |source: std::io::Error| PersistError::Io {
            path: path.clone(),
            source,
        };

        // Written next to the destination and renamed over it once complete
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &serialize(self))
                .map_err(|e| io_err(e.into()))?;
            writer.flush().map_err(io_err)?;
        }
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        debug!(benchmark = %self.name, path = %path.display(), "Saved results");
        Ok(path)
    }

    /// Load the results of benchmark `name` from a file or directory
    pub fn load(path: impl AsRef<Path>, name: &str) -> Result<Self, PersistError> {
        Self::load_file(resolve_path(path.as_ref(), name))
    }

    /// Load results from a specific file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PersistError::NotFound(path.to_path_buf())
            } else {
                PersistError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let saved: SavedResults =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                PersistError::Malformed {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let results = deserialize(saved)?;
        debug!(benchmark = %results.name, path = %path.display(), "Loaded results");
        Ok(results)
    }
}

impl From<&BenchmarkResults> for SavedResults {
    fn from(results: &BenchmarkResults) -> Self {
        serialize(results)
    }
}

impl TryFrom<SavedResults> for BenchmarkResults {
    type Error = PersistError;

    fn try_from(saved: SavedResults) -> Result<Self, Self::Error> {
        deserialize(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricValue;
    use crate::statistics::Statistic;

    fn sample() -> BenchmarkResults {
        let args = ArgumentSpace::new()
            .with_dimension("threads", [1, 2])
            .unwrap()
            .with_dimension("mode", ["small", "big"])
            .unwrap();
        let mut results = BenchmarkResults::new("loop", args);
        results.add_allocator("glibc", AllocatorDescriptor::default());
        results.add_allocator("jemalloc", AllocatorDescriptor::preload("libjemalloc.so"));
        results.add_allocator("unused", AllocatorDescriptor::default());
        results
            .facts_mut()
            .insert("runs".to_string(), serde_json::json!(3));

        let perms: Vec<_> = results.args().permutations().collect();
        for (i, perm) in perms.iter().enumerate().take(3) {
            for run in 0..3 {
                let value = (i * 10 + run) as f64;
                results
                    .record("glibc", perm.clone(), Record::new().with("ops", value))
                    .unwrap();
            }
        }
        results
            .record("jemalloc", perms[0].clone(), Record::new().with("ops", 7.0))
            .unwrap();
        results
            .record(
                "jemalloc",
                perms[0].clone(),
                Record::new().with("ops", MetricValue::Missing),
            )
            .unwrap();
        results.compute_statistics();
        results
    }

    #[test]
    fn test_roundtrip() {
        let results = sample();
        let back = deserialize(serialize(&results)).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_roundtrip_through_json_with_nan_statistics() {
        let results = sample();
        let json = serde_json::to_string(&serialize(&results)).unwrap();
        let saved: SavedResults = serde_json::from_str(&json).unwrap();
        let back = deserialize(saved).unwrap();

        let perm = back.args().permutations().next().unwrap();
        let stats = back.statistics("jemalloc", &perm).unwrap();
        assert!(stats.get(Statistic::Mean, "ops").unwrap().is_nan());
        assert_eq!(back, results);
    }

    #[test]
    fn test_saved_shape() {
        let saved = serialize(&sample());
        assert!(!saved.results.contains_key("unused"));
        assert!(saved.allocators.contains_key("unused"));

        let labels: Vec<_> = saved.results["glibc"]
            .iter()
            .map(|(map, _)| format!("{}-{}", map["threads"], map["mode"]))
            .collect();
        assert_eq!(labels, vec!["1-small", "1-big", "2-small"]);
    }

    #[test]
    fn test_missing_stats_are_recomputed() {
        let results = sample();
        let mut saved = serialize(&results);
        saved.stats = None;
        let back = deserialize(saved).unwrap();
        assert_eq!(back.stats(), results.stats());
    }

    #[test]
    fn test_save_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let results = sample();
        let path = results.save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("loop.json"));

        let back = BenchmarkResults::load(dir.path(), "loop").unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_infinite_outlier_survives_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut results = BenchmarkResults::new("spike", ArgumentSpace::new());
        results.add_allocator("glibc", AllocatorDescriptor::default());
        let perm = results.args().permutations().next().unwrap();
        for v in ["1", "2", "3", "4", "5", "6", "7", "8", "inf"] {
            results
                .record("glibc", perm.clone(), Record::new().with("x", v))
                .unwrap();
        }
        results.compute_statistics();
        results.save(dir.path()).unwrap();

        let back = BenchmarkResults::load(dir.path(), "spike").unwrap();
        assert_eq!(back, results);
        let bundle = back.statistics("glibc", &perm).unwrap();
        assert_eq!(bundle.outliers("x"), Some(&[f64::INFINITY][..]));
        assert_eq!(bundle.get(Statistic::Max, "x"), Some(f64::INFINITY));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("loop.json");
        let err = sample().save(&path).unwrap_err();
        assert!(matches!(err, PersistError::Io { path: p, .. } if p == path));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.json");
        std::fs::write(&path, "previous").unwrap();

        let results = sample();
        assert_eq!(results.save(&path).unwrap(), path);
        assert_eq!(BenchmarkResults::load_file(&path).unwrap(), results);

        // No temporary files are left next to the destination
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("loop.json")]);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = BenchmarkResults::load(dir.path(), "nothing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            BenchmarkResults::load_file(&path),
            Err(PersistError::Malformed { .. })
        ));
    }

    #[test]
    fn test_undeclared_allocator_rejected() {
        let mut saved = serialize(&sample());
        saved.allocators.remove("glibc");
        assert!(matches!(
            deserialize(saved),
            Err(PersistError::UndeclaredAllocator(name)) if name == "glibc"
        ));
    }
}
