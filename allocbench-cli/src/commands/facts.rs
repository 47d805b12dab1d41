//! Facts printing

use super::summarize::load_benchmarks;
use allocbench_report::{FactsOptions, SystemInfo, write_facts};
use std::path::Path;

/// Print the facts blocks of the selected benchmarks, host facts first
pub fn print_facts(
    dir: &Path,
    include: &[String],
    exclude: &[String],
    comment: &str,
) -> anyhow::Result<String> {
    let benchmarks = load_benchmarks(dir, include, exclude)?;
    let system = SystemInfo::collect();

    let mut out = Vec::new();
    for (i, results) in benchmarks.iter().enumerate() {
        let options = FactsOptions {
            comment,
            common: (i == 0).then_some(&system),
            list_allocators: true,
        };
        write_facts(&mut out, results, &options)?;
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}
