// Generic report driver
//
// A report is a list of sections; a section is a list of (category, step)
// pairs. Each step reads the files the layout names for its category, runs
// one analysis and optionally prints a block of text. A failing step is
// recorded and the driver moves on; the files on disk are the only state
// shared between steps.

use crate::aggregate::{calculate_mean_file, MeanSummary};
use crate::cwe_frequency::{
    count_all_cwe_ids, count_selected_cwe_ids, ColumnFrequency, SelectedFrequency,
};
use crate::improvement::{self, model_improvements, ModelImprovement};
use crate::normality::{check_normality_file, NormalityReport};
use crate::ratio::{derive_ratios_file, RatioMode};
use crate::report::config::AnalysisConfig;
use crate::report::layout::{Category, ExperimentLayout, Role};
use crate::schema::TARGET_CWES;
use crate::significance::{
    wilcoxon_cross_model_file, wilcoxon_cross_template_file, SignificanceConfig,
    SignificanceReport,
};
use crate::table::Table;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

const RULE_WIDTH: usize = 63;

/// Groups of steps printed under one banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    /// Ratios, means and improvement per category
    Quantitative,
    /// Target CWE counts per category
    Qualitative,
    /// Every CWE id per category, most frequent first
    CweRanking,
    /// Baseline vs secure template per model
    CrossTemplate,
    /// Model vs model on single-template ratios
    CrossModel,
    /// Shapiro-Wilk on the paired ratio files
    Normality,
}

impl SectionKind {
    /// Sections of the full study, in order
    pub const STUDY: [SectionKind; 4] = [
        SectionKind::Quantitative,
        SectionKind::Qualitative,
        SectionKind::CrossTemplate,
        SectionKind::CrossModel,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Quantitative => "Quantitative Analysis",
            SectionKind::Qualitative => "Qualitative Analysis",
            SectionKind::CweRanking => "CWE Frequency Ranking",
            SectionKind::CrossTemplate => "Statistical Tests Cross Template",
            SectionKind::CrossModel => "Statistical Tests Cross Model",
            SectionKind::Normality => "Normality Tests",
        }
    }
}

/// One unit of work on one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// PairedDataset → PairedRates
    DerivePairedRatios,
    /// Dataset → Rates
    DeriveSingleRatios,
    /// PairedRates → PairedMean
    ComputePairedMean,
    /// Improvement per model from PairedMean
    PrintImprovements,
    /// Target CWE counts from Dataset
    CountSelected,
    /// Every CWE id from Dataset
    CountAll,
    /// Normality of PairedRates
    CheckNormality,
    /// Wilcoxon baseline vs secure on PairedRates
    CrossTemplate,
    /// Wilcoxon model vs model on Rates
    CrossModel,
}

impl Step {
    /// Heading printed before the step's output; silent steps have none
    pub fn heading(self, category: Category) -> Option<String> {
        match self {
            Step::DerivePairedRatios | Step::DeriveSingleRatios | Step::ComputePairedMean => None,
            Step::PrintImprovements => Some(format!("Baseline - {} | Improvement:", category)),
            Step::CountSelected | Step::CountAll => Some(format!("{} | Stats:", category)),
            Step::CheckNormality => Some(format!("Baseline - {} | Normality:", category)),
            Step::CrossTemplate => Some(format!("Baseline - {} | Statistical Test:", category)),
            Step::CrossModel => Some(format!("{} | Statistical Test:", category)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::DerivePairedRatios => "paired ratio derivation",
            Step::DeriveSingleRatios => "single ratio derivation",
            Step::ComputePairedMean => "mean computation",
            Step::PrintImprovements => "improvement",
            Step::CountSelected => "selected CWE count",
            Step::CountAll => "CWE count",
            Step::CheckNormality => "normality check",
            Step::CrossTemplate => "cross-template test",
            Step::CrossModel => "cross-model test",
        };
        f.write_str(label)
    }
}

/// A banner and its steps
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub steps: Vec<(Category, Step)>,
}

fn each(categories: &[Category], step: Step) -> impl Iterator<Item = (Category, Step)> + '_ {
    categories.iter().map(move |&c| (c, step))
}

impl Section {
    /// The step matrix of one section over `categories`
    pub fn standard(kind: SectionKind, categories: &[Category]) -> Self {
        let steps: Vec<(Category, Step)> = match kind {
            SectionKind::Quantitative => each(categories, Step::DerivePairedRatios)
                .chain(each(categories, Step::ComputePairedMean))
                .chain(each(categories, Step::PrintImprovements))
                .collect(),
            SectionKind::Qualitative => std::iter::once((Category::Baseline, Step::CountSelected))
                .chain(each(categories, Step::CountSelected))
                .collect(),
            SectionKind::CweRanking => std::iter::once((Category::Baseline, Step::CountAll))
                .chain(each(categories, Step::CountAll))
                .collect(),
            SectionKind::CrossTemplate => each(categories, Step::CrossTemplate).collect(),
            SectionKind::CrossModel => each(categories, Step::DeriveSingleRatios)
                .chain(each(categories, Step::CrossModel))
                .collect(),
            SectionKind::Normality => each(categories, Step::CheckNormality).collect(),
        };
        Self { kind, steps }
    }
}

/// Sections for `kinds` over the configured categories
pub fn sections_for(kinds: &[SectionKind], config: &AnalysisConfig) -> Vec<Section> {
    let categories = config.report_categories();
    kinds
        .iter()
        .map(|&kind| Section::standard(kind, &categories))
        .collect()
}

/// What a completed step produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StepOutput {
    Ratios { output: PathBuf, columns: Vec<String> },
    Mean { output: PathBuf, summary: MeanSummary },
    Improvements(Vec<ModelImprovement>),
    SelectedCwes(Vec<SelectedFrequency>),
    AllCwes(Vec<ColumnFrequency>),
    Normality(NormalityReport),
    Significance(SignificanceReport),
}

impl StepOutput {
    /// Console text of the step; file-producing steps print nothing
    pub fn to_report_string(&self) -> String {
        match self {
            StepOutput::Ratios { .. } | StepOutput::Mean { .. } => String::new(),
            StepOutput::Improvements(improvements) => improvement::to_report_string(improvements),
            StepOutput::SelectedCwes(columns) => {
                columns.iter().map(SelectedFrequency::to_report_string).collect()
            }
            StepOutput::AllCwes(columns) => {
                columns.iter().map(ColumnFrequency::to_report_string).collect()
            }
            StepOutput::Normality(report) => report.to_report_string(),
            StepOutput::Significance(report) => report.to_report_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed { output: StepOutput },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub section: SectionKind,
    pub category: Category,
    pub step: Step,
    pub outcome: StepOutcome,
}

/// Every step the driver ran, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriverSummary {
    pub records: Vec<StepRecord>,
}

impl DriverSummary {
    pub fn steps_run(&self) -> usize {
        self.records.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed { .. }))
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn output(&self, category: Category, step: Step) -> Option<&StepOutput> {
        self.records
            .iter()
            .find(|r| r.category == category && r.step == step)
            .and_then(|r| match &r.outcome {
                StepOutcome::Completed { output } => Some(output),
                StepOutcome::Failed { .. } => None,
            })
    }
}

/// Runs sections of steps against one experiment layout
#[derive(Debug, Clone)]
pub struct ReportDriver {
    layout: ExperimentLayout,
    significance: SignificanceConfig,
}

impl ReportDriver {
    pub fn new(layout: ExperimentLayout, significance: SignificanceConfig) -> Self {
        Self {
            layout,
            significance,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.layout(), config.significance.clone())
    }

    pub fn layout(&self) -> &ExperimentLayout {
        &self.layout
    }

    /// Run one step; errors carry the category and file involved
    pub fn run_step(&self, category: Category, step: Step) -> Result<StepOutput> {
        let path = |role: Role| self.layout.path(category, role);

        let output = match step {
            Step::DerivePairedRatios | Step::DeriveSingleRatios => {
                let (source, target, mode) = if step == Step::DerivePairedRatios {
                    (Role::PairedDataset, Role::PairedRates, RatioMode::Paired)
                } else {
                    (Role::Dataset, Role::Rates, RatioMode::Single)
                };
                let input = path(source)?;
                let output = path(target)?;
                let derived = derive_ratios_file(&input, &output, mode)
                    .with_context(|| format!("Failed to derive ratios for {}", category))?;
                StepOutput::Ratios {
                    output,
                    columns: derived.headers().to_vec(),
                }
            }
            Step::ComputePairedMean => {
                let input = path(Role::PairedRates)?;
                let output = path(Role::PairedMean)?;
                let summary = calculate_mean_file(&input, &output)
                    .with_context(|| format!("Failed to compute means for {}", category))?;
                StepOutput::Mean { output, summary }
            }
            Step::PrintImprovements => {
                let summary = MeanSummary::from_path(path(Role::PairedMean)?)
                    .with_context(|| format!("Failed to load means for {}", category))?;
                StepOutput::Improvements(model_improvements(&summary))
            }
            Step::CountSelected | Step::CountAll => {
                let table = Table::from_path(path(Role::Dataset)?)
                    .with_context(|| format!("Failed to load dataset for {}", category))?;
                if step == Step::CountSelected {
                    StepOutput::SelectedCwes(count_selected_cwe_ids(&table, &TARGET_CWES))
                } else {
                    StepOutput::AllCwes(count_all_cwe_ids(&table))
                }
            }
            Step::CheckNormality => {
                let report = check_normality_file(&path(Role::PairedRates)?)
                    .with_context(|| format!("Failed to check normality for {}", category))?;
                StepOutput::Normality(report)
            }
            Step::CrossTemplate => {
                let report =
                    wilcoxon_cross_template_file(&path(Role::PairedRates)?, &self.significance)
                        .with_context(|| format!("Cross-template test failed for {}", category))?;
                StepOutput::Significance(report)
            }
            Step::CrossModel => {
                let report = wilcoxon_cross_model_file(&path(Role::Rates)?, &self.significance)
                    .with_context(|| format!("Cross-model test failed for {}", category))?;
                StepOutput::Significance(report)
            }
        };

        Ok(output)
    }

    /// Run every section, printing report text to `out`
    ///
    /// Only write errors on `out` abort the run; step failures are printed
    /// in place and recorded in the summary.
    pub fn run<W: Write>(&self, sections: &[Section], out: &mut W) -> io::Result<DriverSummary> {
        let mut summary = DriverSummary::default();

        for section in sections {
            tracing::info!("Running section: {}", section.kind.title());
            writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
            writeln!(out, "{:-^width$}", section.kind.title(), width = RULE_WIDTH)?;
            writeln!(out, "{}\n\n", "-".repeat(RULE_WIDTH))?;

            let mut printed_any = false;
            for &(category, step) in &section.steps {
                tracing::debug!("{}: {}", category, step);
                let heading = step.heading(category);
                if let Some(heading) = &heading {
                    if printed_any {
                        writeln!(out)?;
                    }
                    writeln!(out, "{}", heading)?;
                    printed_any = true;
                }

                let outcome = match self.run_step(category, step) {
                    Ok(output) => {
                        write!(out, "{}", output.to_report_string())?;
                        StepOutcome::Completed { output }
                    }
                    Err(e) => {
                        tracing::warn!("{} {} failed: {:#}", category, step, e);
                        if heading.is_none() {
                            writeln!(out, "{} | {}:", category, step)?;
                        }
                        writeln!(out, "Error: {:#}", e)?;
                        StepOutcome::Failed {
                            error: format!("{:#}", e),
                        }
                    }
                };

                summary.records.push(StepRecord {
                    section: section.kind,
                    category,
                    step,
                    outcome,
                });
            }

            writeln!(out, "{}\n\n", "-".repeat(RULE_WIDTH))?;
        }

        tracing::info!(
            "Report finished: {} steps, {} failed",
            summary.steps_run(),
            summary.failure_count()
        );
        Ok(summary)
    }
}
