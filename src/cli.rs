//! CLI argument parsing for vulnstat

use crate::cwe_frequency::DEFAULT_TOP_N;
use crate::report::SectionKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Which CWE ids to report per column
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CountMode {
    /// Every id found, most frequent first
    All,
    /// The six target CWEs plus an Others bucket
    Selected,
}

#[derive(Parser, Debug)]
#[command(name = "vulnstat")]
#[command(version)]
#[command(about = "Statistics over CWE findings in LLM-generated code", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Derive CWE-per-LOC ratio columns into a new CSV
    Ratios {
        input: PathBuf,
        output: PathBuf,

        /// Single-template dataset: unsuffixed `{model}_cwe_loc` output
        #[arg(long)]
        single: bool,
    },

    /// Write the mean of every column of a ratio file
    Mean { input: PathBuf, output: PathBuf },

    /// Improvement of the secure template over baseline from a mean summary
    Improvement { mean_csv: PathBuf },

    /// Count CWE ids per `cwe_id` column
    CweCount {
        input: PathBuf,

        #[arg(long, value_enum, default_value = "selected")]
        mode: CountMode,
    },

    /// Rank CWE ids pooled across matching columns
    CweFrequent {
        input: PathBuf,

        /// Substring selecting the pooled columns (e.g. `cwe_id_s`)
        #[arg(long, value_name = "SUBSTRING")]
        columns: String,

        /// Size of the top-N summary
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Shapiro-Wilk normality check of every count/ratio column
    Normality { input: PathBuf },

    /// Wilcoxon test of baseline against secure template per model
    CrossTemplate {
        input: PathBuf,

        /// Metric compared (`{model}_{field}_b` vs `{model}_{field}_s`)
        #[arg(long, default_value = "cwe_loc")]
        field: String,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,
    },

    /// Wilcoxon test between models on single-template ratios
    CrossModel {
        input: PathBuf,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,
    },

    /// Run the full study over an experiment results folder
    Report {
        /// TOML analysis configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Experiment results folder (overrides the configuration)
        #[arg(long, value_name = "DIR")]
        folder: Option<PathBuf>,

        /// Sections to run, in order (default: the four study sections)
        #[arg(long = "section", value_enum)]
        sections: Vec<SectionKind>,
    },
}
