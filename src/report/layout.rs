// File layout of an experiment results folder
//
// Every stage of the pipeline reads and writes named CSV files in one
// folder. The layout maps (category, role) to a path so the driver never
// builds file names itself.

use crate::report::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A slice of the study's questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// Baseline prompts alone, no CWE focus (`Baseline.csv`)
    Baseline,
    /// Questions targeting one CWE (`CWE-259`)
    Cwe(u16),
    /// All questions pooled (`CWE-ALL`)
    All,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Baseline => f.write_str("Baseline"),
            Category::Cwe(id) => write!(f, "CWE-{}", id),
            Category::All => f.write_str("CWE-ALL"),
        }
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("baseline") {
            return Ok(Category::Baseline);
        }
        let id = trimmed
            .strip_prefix("CWE-")
            .or_else(|| trimmed.strip_prefix("cwe-"))
            .unwrap_or(trimmed);
        if id.eq_ignore_ascii_case("all") {
            return Ok(Category::All);
        }
        id.parse::<u16>()
            .map(Category::Cwe)
            .map_err(|_| ConfigError::UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for Category {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.to_string()
    }
}

/// What a file holds for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Raw single-template observations (`CWE-259.csv`)
    Dataset,
    /// Raw observations with baseline and secure columns (`Baseline - CWE-259.csv`)
    PairedDataset,
    /// Derived ratios of the single-template dataset
    Rates,
    /// Derived ratios of the paired dataset
    PairedRates,
    /// Column means of `PairedRates`
    PairedMean,
}

/// Conventional file name, or `None` for combinations the study never produces
pub fn conventional_name(category: Category, role: Role) -> Option<String> {
    if category == Category::Baseline {
        return (role == Role::Dataset).then(|| "Baseline.csv".to_string());
    }

    let name = match role {
        Role::Dataset => format!("{}.csv", category),
        Role::PairedDataset => format!("Baseline - {}.csv", category),
        Role::Rates => format!("{} - Rate.csv", category),
        Role::PairedRates => format!("Baseline - {} - Rate.csv", category),
        Role::PairedMean => format!("Baseline - {} - Mean.csv", category),
    };
    Some(name)
}

/// Explicit (category, role) → path mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentLayout {
    folder: PathBuf,
    overrides: BTreeMap<(Category, Role), PathBuf>,
}

impl ExperimentLayout {
    /// Layout using the conventional names inside `folder`
    pub fn conventional<P: Into<PathBuf>>(folder: P) -> Self {
        Self {
            folder: folder.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Replace one path; relative overrides resolve against the folder
    pub fn with_override<P: Into<PathBuf>>(mut self, category: Category, role: Role, path: P) -> Self {
        let path = path.into();
        let resolved = if path.is_relative() {
            self.folder.join(path)
        } else {
            path
        };
        self.overrides.insert((category, role), resolved);
        self
    }

    pub fn path(&self, category: Category, role: Role) -> Result<PathBuf, ConfigError> {
        if let Some(path) = self.overrides.get(&(category, role)) {
            return Ok(path.clone());
        }
        conventional_name(category, role)
            .map(|name| self.folder.join(name))
            .ok_or(ConfigError::NoPath { category, role })
    }
}
