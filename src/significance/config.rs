// Configuration for the paired significance tests

use serde::{Deserialize, Serialize};

/// Largest number of non-zero differences for which the exact null
/// distribution of the signed-rank statistic is enumerated
pub const DEFAULT_EXACT_MAX_N: usize = 50;

/// Configuration for paired Wilcoxon comparisons
///
/// # Example
/// ```
/// use vulnstat::significance::SignificanceConfig;
///
/// let config = SignificanceConfig::default();
/// assert_eq!(config.alpha, 0.05);
/// assert_eq!(config.field, "cwe_loc");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Significance level; a comparison is significant when p < alpha
    ///
    /// - 0.05 (default): the level used throughout the study
    /// - 0.01: stricter, fewer false positives
    /// - 0.10: looser, for exploratory runs
    pub alpha: f64,

    /// Metric compared in cross-template mode (`{model}_{field}_{b|s}`)
    ///
    /// Default: `cwe_loc`, the derived defect density
    pub field: String,

    /// Exact p-values are used up to this many non-zero differences when the
    /// sample has no ties; larger or tied samples use the normal approximation
    pub exact_max_n: usize,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            field: "cwe_loc".to_string(),
            exact_max_n: DEFAULT_EXACT_MAX_N,
        }
    }
}

impl SignificanceConfig {
    /// 99% confidence
    pub fn strict() -> Self {
        Self {
            alpha: 0.01,
            ..Self::default()
        }
    }

    /// 90% confidence
    pub fn permissive() -> Self {
        Self {
            alpha: 0.10,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(format!("alpha must be in (0, 1), got {}", self.alpha));
        }

        if self.field.trim().is_empty() {
            return Err("field must not be empty".to_string());
        }

        // 2^n subset counts must fit in a u64
        if self.exact_max_n > 63 {
            return Err(format!(
                "exact_max_n must be <= 63, got {}",
                self.exact_max_n
            ));
        }

        Ok(())
    }
}
