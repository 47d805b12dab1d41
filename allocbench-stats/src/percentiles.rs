//! Percentile Computation
//!
//! Linear interpolation between closest ranks, the same convention numpy uses
//! by default. Quartiles and medians of allocator runs are all computed here.

/// Lower and upper quartile of a sample set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    /// 25th percentile
    pub lower: f64,
    /// 75th percentile
    pub upper: f64,
}

impl Quartiles {
    /// Interquartile range (`upper - lower`)
    pub fn range(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks. Returns NaN for an empty
/// sample set or when any sample is NaN, so missing runs poison the result
/// instead of being silently reordered.
///
/// # Examples
///
/// ```
/// # use allocbench_stats::compute_percentile;
/// let samples = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 2.5);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() || samples.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }

    if samples.len() == 1 {
        return samples[0];
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_of_sorted(&sorted, percentile)
}

/// Compute lower and upper quartile with a single sort
pub fn compute_quartiles(samples: &[f64]) -> Quartiles {
    if samples.is_empty() || samples.iter().any(|x| x.is_nan()) {
        return Quartiles {
            lower: f64::NAN,
            upper: f64::NAN,
        };
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Quartiles {
        lower: percentile_of_sorted(&sorted, 25.0),
        upper: percentile_of_sorted(&sorted, 75.0),
    }
}

fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let p = (percentile / 100.0).clamp(0.0, 1.0);

    // Linear interpolation between nearest ranks
    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}
