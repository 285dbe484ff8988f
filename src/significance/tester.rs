// Paired comparisons over the study's subjects
//
// Cross-template: one subject per model, baseline column against secure
// column of the same metric. Cross-model: one subject per model pair, the
// single-template ratio columns against each other. Each subject is tested
// independently; a missing column or a degenerate sample is recorded on that
// subject and the batch continues.

use crate::schema::{column_name, metric_column, Metric, Model, Variant};
use crate::significance::config::SignificanceConfig;
use crate::significance::effect_size::{
    effect_size_from_p_value, effect_size_from_statistic, EffectMagnitude,
};
use crate::significance::wilcoxon::wilcoxon_signed_rank;
use crate::table::{self, Coercion, Table};
use serde::Serialize;
use std::path::Path;

/// Result of one paired test with its effect size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSizeResult {
    /// Wilcoxon statistic W = min(R+, R−)
    pub statistic: f64,

    /// Two-sided p-value
    pub p_value: f64,

    /// p < alpha
    pub significant: bool,

    /// Standardized effect size (infinite when p == 0 in cross-model mode)
    pub effect_r: f64,

    pub effect_label: EffectMagnitude,

    /// Rows surviving complete-case deletion
    pub n_pairs: usize,

    /// Pairs with a non-zero difference
    pub n_nonzero: usize,
}

/// What happened to one subject
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubjectOutcome {
    Tested(EffectSizeResult),

    /// Required columns are absent from the input
    Skipped { reason: String },

    /// The test could not be computed on this subject
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectReport {
    /// `gpt` in cross-template mode, `gpt vs gemini` in cross-model mode
    pub subject: String,
    pub outcome: SubjectOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    CrossTemplate,
    CrossModel,
}

/// Outcomes for every subject of one input file, in evaluation order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceReport {
    pub mode: ComparisonMode,
    pub alpha: f64,
    pub subjects: Vec<SubjectReport>,
}

impl SignificanceReport {
    pub fn get(&self, subject: &str) -> Option<&SubjectOutcome> {
        self.subjects
            .iter()
            .find(|s| s.subject == subject)
            .map(|s| &s.outcome)
    }

    /// Number of subjects that produced a test result
    pub fn tested_count(&self) -> usize {
        self.subjects
            .iter()
            .filter(|s| matches!(s.outcome, SubjectOutcome::Tested(_)))
            .count()
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        for subject in &self.subjects {
            match &subject.outcome {
                SubjectOutcome::Tested(result) => {
                    report.push_str(&format!("\nLLM: {}\n", subject.subject));
                    report.push_str(&format!(" - Wilcoxon statistic: {:?}\n", result.statistic));
                    report.push_str(&format!(" - p-value: {:.6}\n", result.p_value));
                    report.push_str(&format!(
                        " - Statistically significant: {}\n",
                        if result.significant { "✅" } else { "❌" }
                    ));
                    report.push_str(&format!(
                        " - Effect size r: {:.4} ({})\n",
                        result.effect_r, result.effect_label
                    ));
                }
                SubjectOutcome::Skipped { reason } => {
                    report.push_str(&format!(
                        "\nLLM: {} - Skipped: {}\n",
                        subject.subject, reason
                    ));
                }
                SubjectOutcome::Failed { error } => {
                    report.push_str(&format!("\nLLM: {} - Error: {}\n", subject.subject, error));
                }
            }
        }

        report
    }
}

/// Keep only rows where both values are present, preserving row order
pub fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

fn missing_columns(table: &Table, columns: &[&str]) -> Option<String> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| !table.has_column(c))
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("missing columns: {}", missing.join(", ")))
    }
}

fn numeric_pair(table: &Table, left: &str, right: &str) -> (Vec<f64>, Vec<f64>) {
    let x = table.numeric_column(left, Coercion::Missing).unwrap_or_default();
    let y = table.numeric_column(right, Coercion::Missing).unwrap_or_default();
    complete_pairs(&x, &y)
}

fn record(subject: String, outcome: SubjectOutcome) -> SubjectReport {
    match &outcome {
        SubjectOutcome::Skipped { reason } => {
            tracing::debug!("Skipping {}: {}", subject, reason);
        }
        SubjectOutcome::Failed { error } => {
            tracing::warn!("Wilcoxon test failed for {}: {}", subject, error);
        }
        SubjectOutcome::Tested(result) => {
            tracing::debug!(
                "{}: W={}, p={:.6}, r={:.4}",
                subject,
                result.statistic,
                result.p_value,
                result.effect_r
            );
        }
    }
    SubjectReport { subject, outcome }
}

/// Baseline against secure template for every model
///
/// Compares `{model}_{field}_b` with `{model}_{field}_s`. The effect size is
/// derived from the statistic over the non-zero differences.
pub fn wilcoxon_cross_template(table: &Table, config: &SignificanceConfig) -> SignificanceReport {
    let subjects = Model::ALL
        .iter()
        .map(|&model| {
            let baseline = column_name(model, &config.field, Some(Variant::Baseline));
            let secure = column_name(model, &config.field, Some(Variant::Secure));

            let outcome = match missing_columns(table, &[&baseline, &secure]) {
                Some(reason) => SubjectOutcome::Skipped { reason },
                None => {
                    let (x, y) = numeric_pair(table, &baseline, &secure);
                    match wilcoxon_signed_rank(&x, &y, config.exact_max_n) {
                        Ok(test) => {
                            let r = effect_size_from_statistic(test.statistic, test.n_nonzero);
                            SubjectOutcome::Tested(EffectSizeResult {
                                statistic: test.statistic,
                                p_value: test.p_value,
                                significant: test.p_value < config.alpha,
                                effect_r: r,
                                effect_label: EffectMagnitude::from_r(r),
                                n_pairs: test.n_pairs,
                                n_nonzero: test.n_nonzero,
                            })
                        }
                        Err(e) => SubjectOutcome::Failed {
                            error: e.to_string(),
                        },
                    }
                }
            };

            record(model.key().to_string(), outcome)
        })
        .collect();

    SignificanceReport {
        mode: ComparisonMode::CrossTemplate,
        alpha: config.alpha,
        subjects,
    }
}

/// Every model pair on the single-template ratio columns
///
/// Compares `{a}_cwe_loc` with `{b}_cwe_loc` for each pair in
/// [`Model::PAIRS`] order. The effect size is derived from the p-value over
/// the complete pairs; p == 0 gives an infinite, large effect.
pub fn wilcoxon_cross_model(table: &Table, config: &SignificanceConfig) -> SignificanceReport {
    let subjects = Model::PAIRS
        .iter()
        .map(|&(a, b)| {
            let left = metric_column(a, Metric::CweLoc, None);
            let right = metric_column(b, Metric::CweLoc, None);

            let outcome = match missing_columns(table, &[&left, &right]) {
                Some(reason) => SubjectOutcome::Skipped { reason },
                None => {
                    let (x, y) = numeric_pair(table, &left, &right);
                    match wilcoxon_signed_rank(&x, &y, config.exact_max_n) {
                        Ok(test) => {
                            let r = effect_size_from_p_value(test.p_value, test.n_pairs);
                            SubjectOutcome::Tested(EffectSizeResult {
                                statistic: test.statistic,
                                p_value: test.p_value,
                                significant: test.p_value < config.alpha,
                                effect_r: r,
                                effect_label: EffectMagnitude::from_r(r),
                                n_pairs: test.n_pairs,
                                n_nonzero: test.n_nonzero,
                            })
                        }
                        Err(e) => SubjectOutcome::Failed {
                            error: e.to_string(),
                        },
                    }
                }
            };

            record(format!("{} vs {}", a.key(), b.key()), outcome)
        })
        .collect();

    SignificanceReport {
        mode: ComparisonMode::CrossModel,
        alpha: config.alpha,
        subjects,
    }
}

pub fn wilcoxon_cross_template_file(
    path: &Path,
    config: &SignificanceConfig,
) -> table::Result<SignificanceReport> {
    let table = Table::from_path(path)?;
    Ok(wilcoxon_cross_template(&table, config))
}

pub fn wilcoxon_cross_model_file(
    path: &Path,
    config: &SignificanceConfig,
) -> table::Result<SignificanceReport> {
    let table = Table::from_path(path)?;
    Ok(wilcoxon_cross_model(&table, config))
}
