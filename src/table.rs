//! Column-oriented CSV tables for experiment snapshots
//!
//! Every dataset in the study is a CSV file with one row per question and a
//! fixed header convention (`{model}_{metric}_{variant}`). Cells are kept as
//! raw text and coerced to numbers on demand, so the same table can feed both
//! the numeric stages and the CWE-id tallies.

use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or writing a table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("empty file or invalid data: {0}")]
    Empty(PathBuf),

    #[error("malformed CSV in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("too many fields in {path} on line {line}: expected {expected}, found {found}")]
    ExtraFields {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;

/// How unparsable cells are treated when a column is read as numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Unparsable or empty cells become missing
    Missing,
    /// Unparsable or empty cells become 0 (count semantics)
    Zero,
}

/// A CSV table stored column by column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a CSV file on disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TableError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(file, path)
    }

    /// Parse a table from any reader; `origin` is only used in error messages
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let malformed = |source| TableError::Malformed {
            path: origin.to_path_buf(),
            source,
        };

        // Short rows are padded with missing cells; long rows are rejected below.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let raw_headers = reader.headers().map_err(malformed)?.clone();
        if raw_headers.is_empty() {
            return Err(TableError::Empty(origin.to_path_buf()));
        }

        // Unlabeled header cells get the name a dataframe reader would give them,
        // which is what the mean summaries are keyed on ("Unnamed: 0").
        let headers: Vec<String> = raw_headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                if h.trim().is_empty() {
                    format!("Unnamed: {}", idx)
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(malformed)?;
            if record.len() > headers.len() {
                return Err(TableError::ExtraFields {
                    path: origin.to_path_buf(),
                    line: record.position().map_or(0, csv::Position::line),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            for (idx, column) in columns.iter_mut().enumerate() {
                let cell = record.get(idx).map(str::trim).filter(|c| !c.is_empty());
                column.push(cell.map(str::to_string));
            }
        }

        tracing::debug!(
            "Loaded {} ({} columns, {} rows)",
            origin.display(),
            headers.len(),
            columns.first().map_or(0, Vec::len)
        );

        Ok(Self { headers, columns })
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// True when the table has no columns or no rows
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.row_count() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Raw text cells of a column, `None` for empty cells
    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Read a column as numbers
    ///
    /// Returns `None` when the column is absent. NaN and infinite values are
    /// treated like any other unparsable cell.
    pub fn numeric_column(&self, name: &str, coercion: Coercion) -> Option<Vec<Option<f64>>> {
        self.column(name).map(|cells| {
            cells
                .iter()
                .map(|cell| {
                    let parsed = cell
                        .as_deref()
                        .and_then(|c| c.parse::<f64>().ok())
                        .filter(|v| v.is_finite());
                    match (parsed, coercion) {
                        (Some(v), _) => Some(v),
                        (None, Coercion::Zero) => Some(0.0),
                        (None, Coercion::Missing) => None,
                    }
                })
                .collect()
        })
    }

    /// Columns whose name contains `needle`
    pub fn columns_containing<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |h| h.contains(needle))
            .map(String::as_str)
    }

    /// Append a text column
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Option<String>>) -> Result<()> {
        let name = name.into();
        if !self.headers.is_empty() && cells.len() != self.row_count() {
            return Err(TableError::RaggedColumn {
                column: name,
                expected: self.row_count(),
                actual: cells.len(),
            });
        }
        self.headers.push(name);
        self.columns.push(cells);
        Ok(())
    }

    /// Append a numeric column; missing values become empty cells
    pub fn push_numeric_column(&mut self, name: impl Into<String>, values: &[Option<f64>]) -> Result<()> {
        let cells = values.iter().map(|v| v.map(format_number)).collect();
        self.push_column(name, cells)
    }

    /// Write the table as CSV (no index column)
    pub fn write_csv<W: Write>(&self, writer: W, origin: &Path) -> Result<()> {
        let malformed = |source| TableError::Malformed {
            path: origin.to_path_buf(),
            source,
        };

        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers).map_err(malformed)?;
        for row in 0..self.row_count() {
            let record = self
                .columns
                .iter()
                .map(|column| column[row].as_deref().unwrap_or(""));
            wtr.write_record(record).map_err(malformed)?;
        }
        wtr.flush().map_err(|source| TableError::Io {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Write the table to a CSV file, replacing any existing file
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv(file, path)
    }
}

/// Shortest round-trip decimal rendering (`0.04`, `2`, `0.3333333333333333`)
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
