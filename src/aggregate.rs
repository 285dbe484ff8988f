//! Column-wise means and the two-column mean summary file
//!
//! The summary CSV has an unlabeled index column holding the original column
//! names and a `Mean` column. On read the index header is `Unnamed: 0`.

use crate::table::{format_number, Coercion, Result as TableResult, Table, TableError};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header of the value column in a mean summary
pub const MEAN_HEADER: &str = "Mean";

/// Header assigned to the unlabeled index column when a summary is read back
pub const INDEX_HEADER: &str = "Unnamed: 0";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("cannot aggregate an empty table: {0}")]
    EmptyInput(PathBuf),

    #[error("mean summary {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, AggregateError>;

/// Mean of the present values; `None` when nothing is present
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// One mean per original column, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeanSummary {
    entries: Vec<(String, Option<f64>)>,
}

impl MeanSummary {
    /// Compute the mean of every column of `table`
    ///
    /// Cells that do not parse as numbers are ignored, like empty cells.
    pub fn from_table(table: &Table, origin: &Path) -> Result<Self> {
        if table.is_empty() {
            return Err(AggregateError::EmptyInput(origin.to_path_buf()));
        }

        let entries = table
            .headers()
            .iter()
            .map(|name| {
                let values = table
                    .numeric_column(name, Coercion::Missing)
                    .unwrap_or_default();
                (name.clone(), mean(&values))
            })
            .collect();

        Ok(Self { entries })
    }

    /// Read a summary written by [`MeanSummary::write_csv`]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = Table::from_path(path)?;

        let index_header = if table.has_column(INDEX_HEADER) {
            INDEX_HEADER.to_string()
        } else {
            // Files written by other tools may label the index; take the first column
            table
                .headers()
                .first()
                .cloned()
                .ok_or_else(|| AggregateError::Table(TableError::Empty(path.to_path_buf())))?
        };

        let (Some(names), Some(values)) = (
            table.column(&index_header),
            table.numeric_column(MEAN_HEADER, Coercion::Missing),
        ) else {
            return Err(AggregateError::MissingColumn {
                path: path.to_path_buf(),
                column: MEAN_HEADER.to_string(),
            });
        };

        let entries = names
            .iter()
            .zip(values)
            .filter_map(|(name, value)| name.clone().map(|n| (n, value)))
            .collect();

        Ok(Self { entries })
    }

    /// Mean for `column`; `None` if absent or undefined
    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| *value)
    }

    pub fn entries(&self) -> &[(String, Option<f64>)] {
        &self.entries
    }

    /// Write the summary as `,Mean` followed by one `name,value` row per column
    pub fn write_csv<W: Write>(&self, writer: W, origin: &Path) -> TableResult<()> {
        let mut table = Table::new();
        table.push_column(
            "",
            self.entries.iter().map(|(name, _)| Some(name.clone())).collect(),
        )?;
        table.push_column(
            MEAN_HEADER,
            self.entries
                .iter()
                .map(|(_, value)| value.map(format_number))
                .collect(),
        )?;
        table.write_csv(writer, origin)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> TableResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv(file, path)
    }
}

/// Load `input`, compute column means and write the summary to `output`
pub fn calculate_mean_file(input: &Path, output: &Path) -> Result<MeanSummary> {
    let table = Table::from_path(input)?;
    let summary = MeanSummary::from_table(&table, input)?;
    summary.write_to_path(output)?;
    tracing::info!(
        "Wrote {} column means to {}",
        summary.entries().len(),
        output.display()
    );
    Ok(summary)
}
