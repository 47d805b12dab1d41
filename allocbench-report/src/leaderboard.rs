//! Leaderboards
//!
//! Ranks allocators per permutation by the mean of a datapoint. Allocators
//! with identical values share a rank; NaN values always rank last.

use crate::datapoint::evaluate_datapoint;
use allocbench_core::{BenchmarkResults, Permutation, Statistic};
use allocbench_logic::Expr;
use std::cmp::Ordering;
use std::fmt::{self, Write as _};

/// Which direction is better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Larger is better (`>`), e.g. throughput
    Descending,
    /// Smaller is better (`<`), e.g. runtime or memory
    Ascending,
}

impl std::str::FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" | "desc" | "higher" => Ok(Order::Descending),
            "<" | "asc" | "lower" => Ok(Order::Ascending),
            other => Err(format!("Unknown order '{}', expected '>' or '<'", other)),
        }
    }
}

/// One rank: a value and every allocator that reached it
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Datapoint value
    pub value: f64,
    /// Allocators with this value, sorted by name
    pub allocators: Vec<String>,
}

/// Ranking of every permutation for one datapoint
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    /// The ranked datapoint
    pub datapoint: Expr,
    /// Per permutation placements, best first, in canonical order
    pub rankings: Vec<(Permutation, Vec<Placement>)>,
}

/// Rank allocators for a single permutation
pub fn rank_permutation(
    results: &BenchmarkResults,
    datapoint: &Expr,
    perm: &Permutation,
    order: Order,
) -> Vec<Placement> {
    let mut values: Vec<(f64, &str)> = results
        .allocator_names()
        .map(|alloc| {
            (
                evaluate_datapoint(results, datapoint, alloc, perm, Statistic::Mean),
                alloc,
            )
        })
        .collect();

    values.sort_by(|(a, _), (b, _)| compare(*a, *b, order));

    let mut placements: Vec<Placement> = Vec::new();
    for (value, alloc) in values {
        match placements.last_mut() {
            Some(last) if same_value(last.value, value) => last.allocators.push(alloc.to_string()),
            _ => placements.push(Placement {
                value,
                allocators: vec![alloc.to_string()],
            }),
        }
    }
    placements
}

/// Rank allocators for every permutation of the benchmark
pub fn leaderboard(results: &BenchmarkResults, datapoint: &Expr, order: Order) -> Leaderboard {
    let rankings = results
        .args()
        .permutations()
        .map(|perm| {
            let placements = rank_permutation(results, datapoint, &perm, order);
            (perm, placements)
        })
        .collect();

    Leaderboard {
        datapoint: datapoint.clone(),
        rankings,
    }
}

fn compare(a: f64, b: f64, order: Order) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match order {
            Order::Ascending => a.total_cmp(&b),
            Order::Descending => b.total_cmp(&a),
        },
    }
}

fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "leaderboard for \"{}\":", self.datapoint)?;
        for (perm, placements) in &self.rankings {
            writeln!(f, "{}:", perm)?;
            for (i, placement) in placements.iter().enumerate() {
                writeln!(
                    f,
                    "{}. {}: {}",
                    i + 1,
                    placement.allocators.join(","),
                    placement.value
                )?;
            }
        }
        Ok(())
    }
}

/// Render several leaderboards as plain text
pub fn format_leaderboards(boards: &[Leaderboard]) -> String {
    let mut out = String::new();
    for (i, board) in boards.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}", board);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapoint::tests::sample_results;
    use allocbench_core::AllocatorDescriptor;

    #[test]
    fn test_order_directions() {
        let results = sample_results();
        let expr = Expr::Metric("ops".into());

        let board = leaderboard(&results, &expr, Order::Descending);
        assert_eq!(board.rankings.len(), 2);
        let (_, first) = &board.rankings[0];
        assert_eq!(first[0].allocators, vec!["jemalloc"]);
        assert_eq!(first[1].allocators, vec!["glibc"]);

        let board = leaderboard(&results, &expr, Order::Ascending);
        assert_eq!(board.rankings[0].1[0].allocators, vec!["glibc"]);
    }

    #[test]
    fn test_ties_share_a_rank_and_nan_ranks_last() {
        let mut results = sample_results();
        results.add_allocator("unmeasured", AllocatorDescriptor::default());
        let perm = results.args().permutations().next().unwrap();

        let tied = rank_permutation(
            &results,
            &Expr::Metric("task-clock".into()),
            &perm,
            Order::Ascending,
        );
        assert_eq!(tied.len(), 2);
        assert_eq!(tied[0].allocators, vec!["glibc", "jemalloc"]);
        assert_eq!(tied[0].value, 2.0);
        assert!(tied[1].value.is_nan());
        assert_eq!(tied[1].allocators, vec!["unmeasured"]);
    }

    #[test]
    fn test_text_rendering() {
        let results = sample_results();
        let board = leaderboard(&results, &Expr::Metric("ops".into()), Order::Descending);
        let text = format_leaderboards(&[board]);
        assert!(text.starts_with("leaderboard for \"{ops}\":\n(threads=1):\n1. jemalloc: 20\n2. glibc: 10\n"));
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(">".parse::<Order>().unwrap(), Order::Descending);
        assert_eq!("<".parse::<Order>().unwrap(), Order::Ascending);
        assert!("=".parse::<Order>().is_err());
    }
}
