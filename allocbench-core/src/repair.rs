//! Result Repair
//!
//! A crashed or timed-out run leaves an empty record behind. Before the
//! statistics pass, every empty record is replaced with the key set of the
//! first successful run, all values missing, so the failure shows up as NaN
//! instead of silently shrinking the sample.

use crate::record::Record;
use crate::results::BenchmarkResults;
use tracing::{debug, warn};

/// Key set of the first non-empty record
///
/// Search order is allocators by name, then permutations in canonical order,
/// then runs in execution order.
pub fn find_template(results: &BenchmarkResults) -> Option<Vec<String>> {
    results.results.values().find_map(|table| {
        results.args.permutations().find_map(|perm| {
            table
                .get(&perm)
                .iter()
                .find(|record| !record.is_failed())
                .map(|record| record.keys().map(str::to_string).collect())
        })
    })
}

/// Replace every empty record with a missing-valued copy of `template`
///
/// Returns the number of records replaced.
pub fn expand_failures(results: &mut BenchmarkResults, template: &[String]) -> usize {
    let mut replaced = 0;
    for (allocator, table) in results.results.iter_mut() {
        let mut failed = 0;
        for record in table.runs_mut().filter(|r| r.is_failed()) {
            *record = Record::missing_from(template.iter().map(String::as_str));
            failed += 1;
        }
        if failed > 0 {
            debug!(allocator = %allocator, failed, "Expanded failed runs");
        }
        replaced += failed;
    }
    replaced
}

impl BenchmarkResults {
    /// Expand failed runs against the first successful one
    ///
    /// Without any successful run there is nothing to expand against and the
    /// results are left unchanged.
    pub fn repair_failures(&mut self) -> usize {
        match find_template(self) {
            Some(template) => expand_failures(self, &template),
            None => {
                if self.results.values().any(|t| !t.is_empty()) {
                    warn!(benchmark = %self.name, "Every run failed, nothing to expand");
                }
                0
            }
        }
    }
}
