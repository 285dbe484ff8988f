//! Shared statistical primitives
//!
//! Standard normal CDF/quantile (via statrs' error functions) and average
//! ranking with tie bookkeeping, used by both the Wilcoxon and Shapiro-Wilk
//! implementations.

use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;
use thiserror::Error;

/// Failures of a single statistical computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Insufficient data: need at least {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Samples differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("All paired differences are zero; the signed-rank test is undefined")]
    AllDifferencesZero,

    #[error("Zero variance in the null distribution")]
    ZeroVariance,

    #[error("Non-finite value in sample")]
    NonFinite,
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Φ(x) for the standard normal
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// 1 − Φ(x), accurate in the upper tail
pub fn normal_sf(x: f64) -> f64 {
    0.5 * erfc(x / SQRT_2)
}

/// Φ⁻¹(p); ±∞ at the ends of the unit interval, NaN outside it
pub fn normal_ppf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Ranks of `values` (1-based), ties sharing the average of their positions
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub ranks: Vec<f64>,
    /// Size of every group of tied values (groups of 1 omitted)
    pub tie_groups: Vec<usize>,
}

impl Ranking {
    pub fn has_ties(&self) -> bool {
        !self.tie_groups.is_empty()
    }
}

/// Rank values in ascending order with average ranks for ties
pub fn average_ranks(values: &[f64]) -> Ranking {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_groups = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold equal values: ranks start+1 ..= end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = avg;
        }
        if end - start > 1 {
            tie_groups.push(end - start);
        }
        start = end;
    }

    Ranking { ranks, tie_groups }
}
