//! Dataset naming conventions
//!
//! Column headers follow `{model}_{metric}[_{variant}]`, e.g. `gpt_cwe_count_b`,
//! `gemini_loc_s`, `deepseek_cwe_id`, `gpt_cwe_loc_b`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CWE categories targeted by the secure prompt templates
pub const TARGET_CWES: [&str; 6] = ["259", "295", "327", "397", "477", "798"];

/// Token used in `*_cwe_id` cells for "no weakness found"
pub const NO_WEAKNESS: &str = "0";

/// Models whose responses were collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Gpt,
    Gemini,
    Deepseek,
    /// Listed in comparison matrices, never populated by the collection stage
    Codellama,
}

impl Model {
    /// Models with data in every dataset
    pub const POPULATED: [Model; 3] = [Model::Gpt, Model::Gemini, Model::Deepseek];

    /// Models considered by the cross-template comparison (absent ones are skipped)
    pub const ALL: [Model; 4] = [Model::Gpt, Model::Gemini, Model::Deepseek, Model::Codellama];

    /// Model pairs compared by the cross-model test, in report order
    pub const PAIRS: [(Model, Model); 3] = [
        (Model::Gpt, Model::Gemini),
        (Model::Gpt, Model::Deepseek),
        (Model::Gemini, Model::Deepseek),
    ];

    /// Column prefix (`gpt`, `gemini`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Model::Gpt => "gpt",
            Model::Gemini => "gemini",
            Model::Deepseek => "deepseek",
            Model::Codellama => "codellama",
        }
    }

    /// Human-facing name used in printed reports
    pub fn display_name(self) -> &'static str {
        match self {
            Model::Gpt => "GPT",
            Model::Gemini => "Gemini",
            Model::Deepseek => "Deepseek",
            Model::Codellama => "CodeLlama",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Prompt template condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Plain problem statement
    #[serde(rename = "b")]
    Baseline,
    /// Problem statement wrapped in a secure-coding template
    #[serde(rename = "s")]
    Secure,
}

impl Variant {
    pub const BOTH: [Variant; 2] = [Variant::Baseline, Variant::Secure];

    pub fn suffix(self) -> &'static str {
        match self {
            Variant::Baseline => "b",
            Variant::Secure => "s",
        }
    }
}

/// Per-question metric recorded for each response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CweCount,
    Loc,
    CweId,
    /// Derived defect density (cwe_count / loc)
    CweLoc,
}

impl Metric {
    pub fn key(self) -> &'static str {
        match self {
            Metric::CweCount => "cwe_count",
            Metric::Loc => "loc",
            Metric::CweId => "cwe_id",
            Metric::CweLoc => "cwe_loc",
        }
    }
}

/// Build a column name; `variant = None` yields the unsuffixed form
pub fn column_name(model: Model, metric: &str, variant: Option<Variant>) -> String {
    match variant {
        Some(v) => format!("{}_{}_{}", model.key(), metric, v.suffix()),
        None => format!("{}_{}", model.key(), metric),
    }
}

/// Shorthand for the fixed metrics
pub fn metric_column(model: Model, metric: Metric, variant: Option<Variant>) -> String {
    column_name(model, metric.key(), variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        assert_eq!(
            metric_column(Model::Gpt, Metric::CweCount, Some(Variant::Baseline)),
            "gpt_cwe_count_b"
        );
        assert_eq!(
            metric_column(Model::Deepseek, Metric::Loc, Some(Variant::Secure)),
            "deepseek_loc_s"
        );
        assert_eq!(metric_column(Model::Gemini, Metric::CweLoc, None), "gemini_cwe_loc");
        assert_eq!(column_name(Model::Codellama, "cq", Some(Variant::Secure)), "codellama_cq_s");
    }

    #[test]
    fn test_pairs_order() {
        assert_eq!(Model::PAIRS[0], (Model::Gpt, Model::Gemini));
        assert_eq!(Model::PAIRS[2], (Model::Gemini, Model::Deepseek));
    }

    #[test]
    fn test_target_cwes_sorted() {
        let mut sorted = TARGET_CWES;
        sorted.sort();
        assert_eq!(sorted, TARGET_CWES);
    }
}
