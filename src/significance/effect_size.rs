// Effect size r for signed-rank comparisons
//
// Two derivations, not numerically interchangeable:
// - from the statistic: z from W by the normal approximation, r = |z| / sqrt(N)
//   with N the number of non-zero differences (cross-template comparisons)
// - from the p-value: z = |Φ⁻¹(p/2)|, r = z / sqrt(n) with n the number of
//   complete pairs (cross-model comparisons)

use crate::stats::normal_ppf;
use serde::Serialize;
use std::fmt;

/// Qualitative magnitude band of r
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    /// r < 0.1
    Negligible,
    /// 0.1 <= r < 0.3
    Small,
    /// 0.3 <= r < 0.5
    Medium,
    /// r >= 0.5
    Large,
}

impl EffectMagnitude {
    /// Band of `r`; every threshold belongs to the band above it
    pub fn from_r(r: f64) -> Self {
        if r < 0.1 {
            EffectMagnitude::Negligible
        } else if r < 0.3 {
            EffectMagnitude::Small
        } else if r < 0.5 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        }
    }

    /// Label used in the Italian result tables
    pub fn italian_label(self) -> &'static str {
        match self {
            EffectMagnitude::Negligible => "trascurabile",
            EffectMagnitude::Small => "piccolo",
            EffectMagnitude::Medium => "medio",
            EffectMagnitude::Large => "grande",
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// r from the signed-rank statistic via the normal approximation
///
/// `n` is the number of non-zero differences and must be positive.
pub fn effect_size_from_statistic(statistic: f64, n: usize) -> f64 {
    let n = n as f64;
    let mean = n * (n + 1.0) / 4.0;
    let sd = (n * (n + 1.0) * (2.0 * n + 1.0) / 24.0).sqrt();
    let z = (statistic - mean) / sd;
    z.abs() / n.sqrt()
}

/// r from a two-sided p-value; p == 0 gives an infinite effect
pub fn effect_size_from_p_value(p_value: f64, n: usize) -> f64 {
    if p_value == 0.0 {
        return f64::INFINITY;
    }
    let z = normal_ppf(p_value / 2.0).abs();
    z / (n as f64).sqrt()
}
