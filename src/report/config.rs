// Analysis configuration loaded from TOML

use crate::report::layout::{Category, ExperimentLayout, Role};
use crate::schema::TARGET_CWES;
use crate::significance::SignificanceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown category '{0}' (expected Baseline, CWE-<id> or CWE-ALL)")]
    UnknownCategory(String),

    #[error("no file configured for {category} / {role:?}")]
    NoPath { category: Category, role: Role },
}

/// One explicit file location replacing the conventional name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathOverride {
    pub category: Category,
    pub role: Role,
    pub path: PathBuf,
}

/// Configuration of a full report run
///
/// # Example TOML
/// ```toml
/// experiment_folder = "/data/experiment_results"
/// categories = [259, 295, 327]
/// include_all = true
///
/// [significance]
/// alpha = 0.05
/// field = "cwe_loc"
///
/// [[paths]]
/// category = "CWE-259"
/// role = "dataset"
/// path = "CWE-259 (rerun).csv"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Folder holding every input and output CSV
    pub experiment_folder: PathBuf,

    /// Target CWE ids, one category each, in report order
    pub categories: Vec<u16>,

    /// Append the pooled CWE-ALL category
    pub include_all: bool,

    pub significance: SignificanceConfig,

    pub paths: Vec<PathOverride>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            experiment_folder: PathBuf::from("experiment_results"),
            categories: TARGET_CWES
                .iter()
                .filter_map(|id| id.parse().ok())
                .collect(),
            include_all: true,
            significance: SignificanceConfig::default(),
            paths: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.significance.validate().map_err(ConfigError::Invalid)?;

        if self.categories.is_empty() && !self.include_all {
            return Err(ConfigError::Invalid(
                "no categories selected and include_all is false".to_string(),
            ));
        }

        Ok(())
    }

    /// CWE categories in configured order, then CWE-ALL when enabled
    pub fn report_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.iter().map(|&id| Category::Cwe(id)).collect();
        if self.include_all {
            categories.push(Category::All);
        }
        categories
    }

    pub fn layout(&self) -> ExperimentLayout {
        self.paths.iter().fold(
            ExperimentLayout::conventional(&self.experiment_folder),
            |layout, o| layout.with_override(o.category, o.role, &o.path),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_target_cwes() {
        let config = AnalysisConfig::default();
        assert_eq!(config.categories, vec![259, 295, 327, 397, 477, 798]);
        assert!(config.validate().is_ok());

        let categories = config.report_categories();
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0], Category::Cwe(259));
        assert_eq!(categories[6], Category::All);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
experiment_folder = "/data/experiment_results"
categories = [259, 798]
include_all = false

[significance]
alpha = 0.01

[[paths]]
category = "CWE-259"
role = "dataset"
path = "CWE-259 (rerun).csv"
"#;
        let config = AnalysisConfig::from_toml_str(toml, Path::new("analysis.toml")).unwrap();
        assert_eq!(config.significance.alpha, 0.01);
        assert_eq!(config.significance.field, "cwe_loc");
        assert_eq!(
            config.report_categories(),
            vec![Category::Cwe(259), Category::Cwe(798)]
        );

        let layout = config.layout();
        assert_eq!(
            layout.path(Category::Cwe(259), Role::Dataset).unwrap(),
            PathBuf::from("/data/experiment_results/CWE-259 (rerun).csv")
        );
        assert_eq!(
            layout.path(Category::Cwe(798), Role::Dataset).unwrap(),
            PathBuf::from("/data/experiment_results/CWE-798.csv")
        );
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = AnalysisConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let err = AnalysisConfig::from_toml_str("[significance]\nalpha = 2.0\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let toml = "[[paths]]\ncategory = \"CWE-x\"\nrole = \"rates\"\npath = \"r.csv\"\n";
        let err = AnalysisConfig::from_toml_str(toml, Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_nothing_selected_rejected() {
        let config = AnalysisConfig {
            categories: Vec::new(),
            include_all: false,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = AnalysisConfig::from_path("/nonexistent/analysis.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
