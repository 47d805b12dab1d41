//! Statistics export
//!
//! Two flat formats for one metric of a benchmark:
//! - CSV: one row per allocator and permutation, one column per statistic
//! - dataref: `\drefset{/<bench>/<alloc>/<perm>/<stat>}{<value>}` lines for
//!   the LaTeX `datatool`/`dataref` packages, preceded by a `%` facts block

use crate::facts::{FactsOptions, SystemInfo, write_facts};
use allocbench_core::{BenchmarkResults, Permutation, Statistic, StatisticsBundle};
use std::io::{self, Write};

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        value.to_string()
    }
}

fn join_outliers(outliers: &[f64], separator: &str) -> String {
    outliers
        .iter()
        .map(|v| format_value(*v))
        .collect::<Vec<_>>()
        .join(separator)
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write the statistics of `metric` as CSV
///
/// Permutations without statistics, or without this metric, get empty
/// statistic columns.
pub fn write_csv<W: Write>(out: &mut W, results: &BenchmarkResults, metric: &str) -> io::Result<()> {
    let mut header: Vec<&str> = vec!["allocator"];
    header.extend(results.args().names().iter().map(String::as_str));
    header.extend(Statistic::ALL.iter().map(|s| s.as_str()));
    header.push("outliers");
    writeln!(
        out,
        "{}",
        header.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(",")
    )?;

    for allocator in results.allocator_names() {
        for perm in results.args().permutations() {
            let mut row = vec![allocator.to_string()];
            row.extend(perm.values().iter().map(ToString::to_string));

            let bundle = results
                .statistics(allocator, &perm)
                .filter(|b| b.outliers(metric).is_some());
            match bundle {
                Some(bundle) => {
                    row.extend(Statistic::ALL.iter().map(|&stat| {
                        bundle.get(stat, metric).map(format_value).unwrap_or_default()
                    }));
                    row.push(join_outliers(bundle.outliers(metric).unwrap_or_default(), ";"));
                }
                None => row.extend(std::iter::repeat_n(String::new(), Statistic::ALL.len() + 1)),
            }

            writeln!(
                out,
                "{}",
                row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")
            )?;
        }
    }
    Ok(())
}

fn dataref_key(bench: &str, allocator: &str, perm: &Permutation, stat: &str) -> String {
    let mut parts = vec![bench.to_string(), allocator.to_string()];
    parts.extend(perm.values().iter().map(ToString::to_string));
    parts.push(stat.to_string());
    format!("/{}", parts.join("/")).replace('_', "-")
}

fn dataref_lines(
    results: &BenchmarkResults,
    allocator: &str,
    perm: &Permutation,
    bundle: &StatisticsBundle,
    metric: &str,
) -> Vec<String> {
    let mut lines: Vec<String> = Statistic::ALL
        .iter()
        .map(|&stat| {
            let value = bundle.get(stat, metric).unwrap_or(f64::NAN);
            format!(
                "\\drefset{{{}}}{{{}}}",
                dataref_key(results.name(), allocator, perm, stat.as_str()),
                format_value(value)
            )
        })
        .collect();
    lines.push(format!(
        "\\drefset{{{}}}{{{}}}",
        dataref_key(results.name(), allocator, perm, "outliers"),
        join_outliers(bundle.outliers(metric).unwrap_or_default(), ",")
    ));
    lines
}

/// Write the statistics of `metric` as dataref definitions
pub fn write_dataref<W: Write>(
    out: &mut W,
    results: &BenchmarkResults,
    metric: &str,
    system: Option<&SystemInfo>,
) -> io::Result<()> {
    write_facts(
        out,
        results,
        &FactsOptions {
            comment: "%",
            common: system,
            list_allocators: false,
        },
    )?;

    for allocator in results.allocator_names() {
        for perm in results.args().permutations() {
            let Some(bundle) = results.statistics(allocator, &perm) else {
                continue;
            };
            for line in dataref_lines(results, allocator, &perm, bundle, metric) {
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}
