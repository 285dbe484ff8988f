// Wilcoxon signed-rank test for paired samples
//
// Zero differences are discarded before ranking. The statistic is the
// smaller of the positive and negative rank sums. Small untied samples get
// an exact p-value from the null distribution of the rank sum; otherwise the
// normal approximation with tie correction is used (no continuity
// correction), two-sided.

use crate::stats::{average_ranks, normal_sf, Result, StatsError};
use serde::Serialize;

/// How the p-value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    Exact,
    NormalApproximation,
}

/// Outcome of a signed-rank test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WilcoxonResult {
    /// min(R+, R−)
    pub statistic: f64,

    /// Two-sided p-value
    pub p_value: f64,

    /// Number of pairs with a non-zero difference (N in the effect-size formula)
    pub n_nonzero: usize,

    /// Number of pairs supplied
    pub n_pairs: usize,

    /// Rank sum of positive differences (x > y)
    pub rank_sum_positive: f64,

    /// Rank sum of negative differences (x < y)
    pub rank_sum_negative: f64,

    pub method: PValueMethod,
}

/// P(T+ <= t) under the null hypothesis for n untied, non-zero differences
pub fn exact_cdf(n: usize, t: usize) -> f64 {
    let max_sum = n * (n + 1) / 2;
    let mut counts = vec![0u64; max_sum + 1];
    counts[0] = 1;
    for k in 1..=n {
        for s in (k..=max_sum).rev() {
            counts[s] += counts[s - k];
        }
    }

    let favourable: u64 = counts.iter().take(t.min(max_sum) + 1).sum();
    favourable as f64 / 2f64.powi(n as i32)
}

/// Paired signed-rank test of `x` against `y`
///
/// # Example
/// ```
/// use vulnstat::significance::wilcoxon_signed_rank;
///
/// let d = [6.0, 8.0, 14.0, 16.0, 23.0, 24.0, 28.0, 29.0, 41.0, -48.0, 49.0, 56.0, 60.0, -67.0, 75.0];
/// let zeros = [0.0; 15];
/// let result = wilcoxon_signed_rank(&d, &zeros, 50).unwrap();
/// assert_eq!(result.statistic, 24.0);
/// assert!((result.p_value - 0.041259765625).abs() < 1e-12);
/// ```
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64], exact_max_n: usize) -> Result<WilcoxonResult> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.is_empty() {
        return Err(StatsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let differences: Vec<f64> = x.iter().zip(y).map(|(a, b)| a - b).collect();
    if differences.iter().any(|d| !d.is_finite()) {
        return Err(StatsError::NonFinite);
    }

    let nonzero: Vec<f64> = differences.iter().copied().filter(|d| *d != 0.0).collect();
    let n = nonzero.len();
    if n == 0 {
        return Err(StatsError::AllDifferencesZero);
    }
    let had_zeros = n < differences.len();

    let magnitudes: Vec<f64> = nonzero.iter().map(|d| d.abs()).collect();
    let ranking = average_ranks(&magnitudes);

    let (mut r_plus, mut r_minus) = (0.0, 0.0);
    for (d, rank) in nonzero.iter().zip(&ranking.ranks) {
        if *d > 0.0 {
            r_plus += rank;
        } else {
            r_minus += rank;
        }
    }
    let statistic = r_plus.min(r_minus);

    let exact = n <= exact_max_n && n <= 63 && !had_zeros && !ranking.has_ties();
    let (p_value, method) = if exact {
        // Without ties every rank sum is an integer
        let p = 2.0 * exact_cdf(n, statistic as usize);
        (p.min(1.0), PValueMethod::Exact)
    } else {
        let nf = n as f64;
        let mean = nf * (nf + 1.0) / 4.0;
        let tie_correction: f64 = ranking
            .tie_groups
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum::<f64>()
            / 48.0;
        let variance = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_correction;
        if variance <= 0.0 {
            return Err(StatsError::ZeroVariance);
        }
        let z = (statistic - mean) / variance.sqrt();
        let p = 2.0 * normal_sf(z.abs());
        (p.min(1.0), PValueMethod::NormalApproximation)
    };

    tracing::debug!(
        "Wilcoxon: n={} (of {}), W={}, p={:.6}, method={:?}",
        n,
        differences.len(),
        statistic,
        p_value,
        method
    );

    Ok(WilcoxonResult {
        statistic,
        p_value,
        n_nonzero: n,
        n_pairs: differences.len(),
        rank_sum_positive: r_plus,
        rank_sum_negative: r_minus,
        method,
    })
}
