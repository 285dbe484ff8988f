// Full-study reports over an experiment results folder
//
// The driver sequences the analyses over every CWE category. File locations
// come from an explicit layout, built from the conventional names and any
// overrides in the TOML configuration.

mod config;
mod driver;
mod layout;

pub use config::{AnalysisConfig, ConfigError, PathOverride};
pub use driver::{
    sections_for, DriverSummary, ReportDriver, Section, SectionKind, Step, StepOutcome,
    StepOutput, StepRecord,
};
pub use layout::{conventional_name, Category, ExperimentLayout, Role};
