//! Raw Result Store
//!
//! The aggregate root of one benchmark's measurements: for every allocator,
//! the records of every run of every argument permutation, in execution
//! order, plus the derived statistics and the run facts.

use crate::allocator::AllocatorDescriptor;
use crate::permutation::{ArgumentSpace, Permutation, PermutationError};
use crate::record::Record;
use crate::statistics::StatisticsTable;
use fxhash::FxHashMap;
use std::collections::BTreeMap;
use thiserror::Error;

/// Free-form facts about a run (host, start time, versions)
pub type Facts = serde_json::Map<String, serde_json::Value>;

/// Errors from recording results
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultsError {
    /// The allocator was never registered with the benchmark.
    #[error("Unknown allocator: {0}")]
    UnknownAllocator(String),

    /// The permutation was built from a different argument space.
    #[error("Permutation over {found:?} does not belong to argument space {expected:?}")]
    ForeignPermutation {
        /// Dimensions of the benchmark
        expected: Vec<String>,
        /// Dimensions of the permutation
        found: Vec<String>,
    },

    /// The permutation holds a value the argument space does not declare.
    #[error(transparent)]
    InvalidPermutation(#[from] PermutationError),
}

/// Runs of one allocator, keyed by permutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    runs: FxHashMap<Permutation, Vec<Record>>,
}

impl ResultTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one run
    pub fn append(&mut self, perm: Permutation, record: Record) {
        self.runs.entry(perm).or_default().push(record);
    }

    /// Runs of a permutation in execution order; empty if never executed
    pub fn get(&self, perm: &Permutation) -> &[Record] {
        self.runs.get(perm).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether a permutation has any runs
    pub fn contains(&self, perm: &Permutation) -> bool {
        self.runs.get(perm).is_some_and(|runs| !runs.is_empty())
    }

    /// Number of permutations with runs
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.runs.values().all(Vec::is_empty)
    }

    /// Total number of runs over all permutations
    pub fn run_count(&self) -> usize {
        self.runs.values().map(Vec::len).sum()
    }

    /// Permutations and their runs, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&Permutation, &[Record])> {
        self.runs.iter().map(|(p, r)| (p, r.as_slice()))
    }

    pub(crate) fn runs_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.runs.values_mut().flatten()
    }
}

/// All results of one benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResults {
    pub(crate) name: String,
    pub(crate) args: ArgumentSpace,
    pub(crate) allocators: BTreeMap<String, AllocatorDescriptor>,
    pub(crate) results: BTreeMap<String, ResultTable>,
    pub(crate) stats: BTreeMap<String, StatisticsTable>,
    pub(crate) facts: Facts,
}

impl BenchmarkResults {
    /// Empty results for a benchmark
    pub fn new(name: impl Into<String>, args: ArgumentSpace) -> Self {
        Self {
            name: name.into(),
            args,
            allocators: BTreeMap::new(),
            results: BTreeMap::new(),
            stats: BTreeMap::new(),
            facts: Facts::new(),
        }
    }

    /// Benchmark name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument space the results are keyed by
    pub fn args(&self) -> &ArgumentSpace {
        &self.args
    }

    /// Registered allocators
    pub fn allocators(&self) -> &BTreeMap<String, AllocatorDescriptor> {
        &self.allocators
    }

    /// Allocator names in sorted order
    pub fn allocator_names(&self) -> impl Iterator<Item = &str> {
        self.allocators.keys().map(String::as_str)
    }

    /// Register an allocator so runs can be recorded for it
    ///
    /// Re-registering replaces the descriptor and keeps recorded runs.
    pub fn add_allocator(&mut self, name: impl Into<String>, descriptor: AllocatorDescriptor) {
        let name = name.into();
        self.results.entry(name.clone()).or_default();
        self.allocators.insert(name, descriptor);
    }

    /// Append one run for an allocator and permutation
    pub fn record(
        &mut self,
        allocator: &str,
        perm: Permutation,
        record: Record,
    ) -> Result<(), ResultsError> {
        if perm.names() != self.args.names() {
            return Err(ResultsError::ForeignPermutation {
                expected: self.args.names().to_vec(),
                found: perm.names().to_vec(),
            });
        }
        for (name, value) in perm.iter() {
            if !self.args.domain(name).is_some_and(|domain| domain.contains(value)) {
                return Err(PermutationError::ValueOutsideDomain {
                    dimension: name.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }
        let table = self
            .results
            .get_mut(allocator)
            .ok_or_else(|| ResultsError::UnknownAllocator(allocator.to_string()))?;
        table.append(perm, record);
        Ok(())
    }

    /// Runs of an allocator and permutation; empty if nothing was recorded
    pub fn runs(&self, allocator: &str, perm: &Permutation) -> &[Record] {
        self.results
            .get(allocator)
            .map(|table| table.get(perm))
            .unwrap_or_default()
    }

    /// Result table of an allocator
    pub fn table(&self, allocator: &str) -> Option<&ResultTable> {
        self.results.get(allocator)
    }

    /// All result tables keyed by allocator
    pub fn tables(&self) -> &BTreeMap<String, ResultTable> {
        &self.results
    }

    /// Statistics of all permutations of an allocator
    pub fn stats_table(&self, allocator: &str) -> Option<&StatisticsTable> {
        self.stats.get(allocator)
    }

    /// All statistics keyed by allocator
    pub fn stats(&self) -> &BTreeMap<String, StatisticsTable> {
        &self.stats
    }

    /// Facts about the run
    pub fn facts(&self) -> &Facts {
        &self.facts
    }

    /// Mutable facts
    pub fn facts_mut(&mut self) -> &mut Facts {
        &mut self.facts
    }
}
