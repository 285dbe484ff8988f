//! vulnstat - statistics over CWE findings in LLM-generated code
//!
//! This library provides the analysis pipeline of a prompt-engineering
//! security study: defect-density ratios, column means and improvement
//! percentages, CWE frequency tallies, Shapiro-Wilk normality checks and
//! paired Wilcoxon comparisons between prompt templates and between models.

pub mod aggregate;
pub mod cli;
pub mod cwe_frequency;
pub mod improvement;
pub mod normality;
pub mod ratio;
pub mod report;
pub mod schema;
pub mod significance;
pub mod stats;
pub mod table;
