//! Defect-density ratios (CWE count per line of code)
//!
//! For every model/variant pair present in a dataset, derives
//! `{model}_cwe_loc[_variant] = cwe_count / loc` row by row. A row with
//! `loc == 0` has no defined ratio and is left missing.

use crate::schema::{metric_column, Metric, Model, Variant};
use crate::table::{Coercion, Result, Table};
use std::path::Path;

/// Which columns a dataset carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioMode {
    /// Both templates per model (`_b` and `_s` columns), output keeps the suffix
    Paired,
    /// One template per model; output columns are unsuffixed (`gpt_cwe_loc`)
    Single,
}

/// Source and destination columns for one derived ratio
#[derive(Debug, Clone, PartialEq, Eq)]
struct RatioColumns {
    cwe_count: String,
    loc: String,
    output: String,
}

impl RatioMode {
    fn columns_for(self, table: &Table, model: Model) -> Vec<RatioColumns> {
        match self {
            RatioMode::Paired => Variant::BOTH
                .iter()
                .map(|&v| RatioColumns {
                    cwe_count: metric_column(model, Metric::CweCount, Some(v)),
                    loc: metric_column(model, Metric::Loc, Some(v)),
                    output: metric_column(model, Metric::CweLoc, Some(v)),
                })
                .collect(),
            RatioMode::Single => {
                // Single-template datasets were exported with the secure suffix;
                // fall back to unsuffixed headers when that is what the file has.
                let suffixed = Some(Variant::Secure);
                let variant = if table.has_column(&metric_column(model, Metric::CweCount, suffixed)) {
                    suffixed
                } else {
                    None
                };
                vec![RatioColumns {
                    cwe_count: metric_column(model, Metric::CweCount, variant),
                    loc: metric_column(model, Metric::Loc, variant),
                    output: metric_column(model, Metric::CweLoc, None),
                }]
            }
        }
    }
}

/// Divide element-wise; a zero denominator yields a missing value
pub fn ratio_column(numerator: &[Option<f64>], denominator: &[Option<f64>]) -> Vec<Option<f64>> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if *d != 0.0 => Some(n / d),
            _ => None,
        })
        .collect()
}

/// Build a fresh table holding only the derived ratio columns
///
/// Pairs whose source columns are absent are skipped; the input table is not
/// modified and none of its columns are carried over.
pub fn derive_ratios(table: &Table, mode: RatioMode) -> Result<Table> {
    let mut derived = Table::new();

    for model in Model::ALL {
        for cols in mode.columns_for(table, model) {
            let (Some(counts), Some(loc)) = (
                table.numeric_column(&cols.cwe_count, Coercion::Zero),
                table.numeric_column(&cols.loc, Coercion::Zero),
            ) else {
                tracing::debug!("Skipping {}: source columns not present", cols.output);
                continue;
            };

            derived.push_numeric_column(cols.output, &ratio_column(&counts, &loc))?;
        }
    }

    Ok(derived)
}

/// Load `input`, derive ratios and write them to `output`
pub fn derive_ratios_file(input: &Path, output: &Path, mode: RatioMode) -> Result<Table> {
    let table = Table::from_path(input)?;
    let derived = derive_ratios(&table, mode)?;
    derived.write_to_path(output)?;
    tracing::info!(
        "Wrote {} ratio columns to {}",
        derived.headers().len(),
        output.display()
    );
    Ok(derived)
}
