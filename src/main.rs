use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use vulnstat::aggregate::{calculate_mean_file, MeanSummary};
use vulnstat::cli::{Cli, Command, CountMode, OutputFormat};
use vulnstat::cwe_frequency::{
    count_all_cwe_ids, count_selected_cwe_ids, most_frequent_cwe, ColumnFrequency,
    SelectedFrequency,
};
use vulnstat::improvement::{self, model_improvements};
use vulnstat::normality::check_normality_file;
use vulnstat::ratio::{derive_ratios_file, RatioMode};
use vulnstat::report::{sections_for, AnalysisConfig, ReportDriver, SectionKind};
use vulnstat::schema::TARGET_CWES;
use vulnstat::significance::{
    wilcoxon_cross_model_file, wilcoxon_cross_template_file, SignificanceConfig,
};
use vulnstat::table::Table;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print `value` as pretty JSON or as the text produced by `render`
fn emit<T: Serialize>(format: OutputFormat, value: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, value).context("Failed to encode JSON")?;
            writeln!(stdout)?;
        }
        OutputFormat::Text => write!(stdout, "{}", render(value))?,
    }
    Ok(())
}

fn significance_config(alpha: f64, field: Option<String>) -> Result<SignificanceConfig> {
    let defaults = SignificanceConfig::default();
    let config = SignificanceConfig {
        alpha,
        field: field.unwrap_or(defaults.field),
        ..defaults
    };
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

fn run_report(
    format: OutputFormat,
    config_path: Option<std::path::PathBuf>,
    folder: Option<std::path::PathBuf>,
    sections: Vec<SectionKind>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_path(&path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(folder) = folder {
        config.experiment_folder = folder;
    }

    let kinds = if sections.is_empty() {
        SectionKind::STUDY.to_vec()
    } else {
        sections
    };
    let driver = ReportDriver::from_config(&config);
    let plan = sections_for(&kinds, &config);
    tracing::info!(
        "Report over {} ({} sections)",
        driver.layout().folder().display(),
        plan.len()
    );

    match format {
        OutputFormat::Text => {
            let mut stdout = io::stdout().lock();
            driver.run(&plan, &mut stdout)?;
        }
        OutputFormat::Json => {
            let summary = driver.run(&plan, &mut io::sink())?;
            emit(format, &summary, |_| String::new())?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let format = args.format;
    match args.command {
        Command::Ratios {
            input,
            output,
            single,
        } => {
            let mode = if single {
                RatioMode::Single
            } else {
                RatioMode::Paired
            };
            let derived = derive_ratios_file(&input, &output, mode)?;
            emit(format, &derived.headers(), |_| String::new())?;
        }
        Command::Mean { input, output } => {
            let summary = calculate_mean_file(&input, &output)?;
            emit(format, &summary, |_| String::new())?;
        }
        Command::Improvement { mean_csv } => {
            let summary = MeanSummary::from_path(&mean_csv)?;
            let improvements = model_improvements(&summary);
            emit(format, &improvements, |i| improvement::to_report_string(i))?;
        }
        Command::CweCount { input, mode } => {
            let table = Table::from_path(&input)?;
            match mode {
                CountMode::All => emit(format, &count_all_cwe_ids(&table), |columns| {
                    columns.iter().map(ColumnFrequency::to_report_string).collect()
                })?,
                CountMode::Selected => {
                    emit(format, &count_selected_cwe_ids(&table, &TARGET_CWES), |columns| {
                        columns.iter().map(SelectedFrequency::to_report_string).collect()
                    })?
                }
            }
        }
        Command::CweFrequent {
            input,
            columns,
            top,
        } => {
            let table = Table::from_path(&input)?;
            let pooled = most_frequent_cwe(&table, &columns, top);
            emit(format, &pooled, |p| p.to_report_string())?;
        }
        Command::Normality { input } => {
            let report = check_normality_file(&input)?;
            emit(format, &report, |r| r.to_report_string())?;
        }
        Command::CrossTemplate {
            input,
            field,
            alpha,
        } => {
            let config = significance_config(alpha, Some(field))?;
            let report = wilcoxon_cross_template_file(&input, &config)?;
            emit(format, &report, |r| r.to_report_string())?;
        }
        Command::CrossModel { input, alpha } => {
            let config = significance_config(alpha, None)?;
            let report = wilcoxon_cross_model_file(&input, &config)?;
            emit(format, &report, |r| r.to_report_string())?;
        }
        Command::Report {
            config,
            folder,
            sections,
        } => run_report(format, config, folder, sections)?,
    }

    Ok(())
}
