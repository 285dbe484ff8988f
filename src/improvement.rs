//! Percentage improvement of the secure template over the baseline

use crate::aggregate::MeanSummary;
use crate::schema::{metric_column, Metric, Model, Variant};
use serde::Serialize;

/// `(baseline - secure) / baseline * 100`, or 0 when the baseline is 0
///
/// Positive values mean the secure template lowered the metric.
pub fn calculate_improvement(baseline: f64, secure: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (baseline - secure) / baseline * 100.0
}

/// Improvement of one model between the two templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelImprovement {
    pub model: Model,
    pub baseline_mean: f64,
    pub secure_mean: f64,
    pub improvement_pct: f64,
}

/// Improvements for every populated model found in a mean summary
///
/// A side without a mean (column absent from the summary) counts as 0.
pub fn model_improvements(summary: &MeanSummary) -> Vec<ModelImprovement> {
    Model::POPULATED
        .iter()
        .map(|&model| {
            let baseline_mean = summary
                .get(&metric_column(model, Metric::CweLoc, Some(Variant::Baseline)))
                .unwrap_or(0.0);
            let secure_mean = summary
                .get(&metric_column(model, Metric::CweLoc, Some(Variant::Secure)))
                .unwrap_or(0.0);
            ModelImprovement {
                model,
                baseline_mean,
                secure_mean,
                improvement_pct: calculate_improvement(baseline_mean, secure_mean),
            }
        })
        .collect()
}

/// One `"{Model} Improvement: {pct:.2}%"` line per model
pub fn to_report_string(improvements: &[ModelImprovement]) -> String {
    improvements
        .iter()
        .map(|imp| {
            format!(
                "{} Improvement: {:.2}%\n",
                imp.model.display_name(),
                imp.improvement_pct
            )
        })
        .collect()
}
