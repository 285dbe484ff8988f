// Per-column normality classification

use crate::normality::shapiro::shapiro_wilk;
use crate::table::{Coercion, Result, Table};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Column-name fragments selecting the columns to check
pub const NORMALITY_KEYWORDS: [&str; 3] = ["cwe_count", "cwe_loc", "loc"];

/// A column is "Normal" when the Shapiro-Wilk p-value exceeds this
pub const NORMALITY_ALPHA: f64 = 0.05;

/// Minimum number of numeric values for the test to run
const MIN_VALUES: usize = 3;

/// Classification of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum NormalityVerdict {
    Normal,
    NonNormal,
    /// Fewer than three numeric values
    UnableToProcess,
    /// The test itself failed on this column
    ProcessingError(String),
}

impl fmt::Display for NormalityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalityVerdict::Normal => f.write_str("Normal"),
            NormalityVerdict::NonNormal => f.write_str("Non normal"),
            NormalityVerdict::UnableToProcess => f.write_str("Unable to process"),
            NormalityVerdict::ProcessingError(e) => write!(f, "Processing error: {}", e),
        }
    }
}

/// Verdict per selected column, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalityReport {
    pub columns: Vec<(String, NormalityVerdict)>,
}

impl NormalityReport {
    pub fn get(&self, column: &str) -> Option<&NormalityVerdict> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, verdict)| verdict)
    }

    /// `{'col': 'Normal', ...}` on one line
    pub fn to_report_string(&self) -> String {
        let body = self
            .columns
            .iter()
            .map(|(name, verdict)| format!("'{}': '{}'", name, verdict))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}\n", body)
    }
}

fn classify(values: &[Option<f64>]) -> NormalityVerdict {
    let sample: Vec<f64> = values.iter().flatten().copied().collect();
    if sample.len() < MIN_VALUES {
        return NormalityVerdict::UnableToProcess;
    }

    match shapiro_wilk(&sample) {
        Ok(result) if result.p_value > NORMALITY_ALPHA => NormalityVerdict::Normal,
        Ok(_) => NormalityVerdict::NonNormal,
        Err(e) => NormalityVerdict::ProcessingError(e.to_string()),
    }
}

/// Classify every column whose name contains one of [`NORMALITY_KEYWORDS`]
///
/// Non-numeric cells count as missing. A failure on one column is recorded
/// as that column's verdict and never stops the others.
pub fn check_normality(table: &Table) -> NormalityReport {
    let columns = table
        .headers()
        .iter()
        .filter(|name| NORMALITY_KEYWORDS.iter().any(|k| name.contains(k)))
        .map(|name| {
            let verdict = match table.numeric_column(name, Coercion::Missing) {
                Some(values) => classify(&values),
                None => NormalityVerdict::ProcessingError(format!("column {} vanished", name)),
            };
            if let NormalityVerdict::ProcessingError(ref e) = verdict {
                tracing::warn!("Normality check failed for {}: {}", name, e);
            }
            (name.clone(), verdict)
        })
        .collect();

    NormalityReport { columns }
}

/// Load a dataset and classify its numeric columns
pub fn check_normality_file(path: &Path) -> Result<NormalityReport> {
    let table = Table::from_path(path)?;
    Ok(check_normality(&table))
}
