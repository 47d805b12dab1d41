//! Output Formatting
//!
//! Human-readable output for summaries and allocator comparisons.
//!
//! Generates terminal-friendly output with:
//! - Per benchmark, the allocators and their plot colors
//! - Per allocator and permutation, metric statistics
//! - Outliers and derived metrics
//! - Comparison tables with relative change and effect size

use allocbench_report::{PermutationComparison, Report};

fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Format a summary report for terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("allocbench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for bench in &report.benchmarks {
        output.push_str(&format!("Benchmark: {}\n", bench.name));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        let allocators: Vec<_> = bench
            .allocators
            .iter()
            .map(|name| match bench.colors.get(name) {
                Some(color) => format!("{} ({})", name, color),
                None => name.clone(),
            })
            .collect();
        output.push_str(&format!("  allocators: {}\n", allocators.join(", ")));

        if bench.datapoints.is_empty() {
            output.push_str("  no statistics\n\n");
            continue;
        }

        for dp in &bench.datapoints {
            output.push_str(&format!(
                "  {} {}  runs: {}\n",
                dp.allocator, dp.permutation, dp.runs
            ));

            for (metric, s) in &dp.metrics {
                let spread = if s.std_perc.is_nan() {
                    String::new()
                } else {
                    format!(" ({:.1}%)", s.std_perc * 100.0)
                };
                output.push_str(&format!(
                    "      {}: mean {}  median {}  std {}{}  min {}  max {}\n",
                    metric,
                    fmt_value(s.mean),
                    fmt_value(s.median),
                    fmt_value(s.std),
                    spread,
                    fmt_value(s.min),
                    fmt_value(s.max)
                ));
                if !s.outliers.is_empty() {
                    let outliers: Vec<_> = s.outliers.iter().map(|v| fmt_value(*v)).collect();
                    output.push_str(&format!("        outliers: {}\n", outliers.join(", ")));
                }
            }

            for derived in &dp.derived {
                match (derived.value, &derived.error) {
                    (Some(v), _) => output.push_str(&format!(
                        "      {} = {}\n",
                        derived.name,
                        fmt_value(v)
                    )),
                    (None, Some(e)) => {
                        output.push_str(&format!("      {}: error: {}\n", derived.name, e))
                    }
                    (None, None) => {}
                }
            }
        }
        output.push('\n');
    }

    output
}

/// Format allocator comparisons as a table
pub fn format_comparison_output(
    benchmark: &str,
    baseline: &str,
    candidate: &str,
    metric: &str,
    comparisons: &[PermutationComparison],
) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}: {} vs {} ({})\n",
        benchmark, candidate, baseline, metric
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    let max_perm_len = comparisons
        .iter()
        .map(|c| c.perm.to_string().len())
        .max()
        .unwrap_or(20)
        .max("Permutation".len());

    output.push_str(&format!(
        "  {:<width$}  {:>10}  {:>8}  {:>8}  {:>10}\n",
        "Permutation",
        "Change",
        "t",
        "P(inc)",
        "Effect",
        width = max_perm_len
    ));
    output.push_str(&format!("  {}\n", "-".repeat(max_perm_len + 44)));

    for cmp in comparisons {
        let perm = cmp.perm.to_string();
        match &cmp.outcome {
            Ok(r) => output.push_str(&format!(
                "  {:<width$}  {:>+9.2}%  {:>8.2}  {:>8.2}  {:>10}\n",
                perm,
                r.relative_change,
                r.t_statistic,
                r.probability_increase,
                r.effect_interpretation.to_string(),
                width = max_perm_len
            )),
            Err(e) => output.push_str(&format!(
                "  {:<width$}  {}\n",
                perm,
                e,
                width = max_perm_len
            )),
        }
    }

    output
}
