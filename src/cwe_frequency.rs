//! CWE identifier frequencies
//!
//! `*_cwe_id` cells hold whitespace-separated CWE numbers found in one
//! response, with `0` meaning "nothing found". Three views are produced:
//! - every distinct id per column, ranked by frequency
//! - the target categories per column plus an `Others` bucket
//! - a pooled ranking across a family of columns with percentage shares

use crate::schema::NO_WEAKNESS;
use crate::table::Table;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Column-name fragment identifying CWE-id columns
pub const CWE_ID_FRAGMENT: &str = "cwe_id";

/// Default size of the pooled top list
pub const DEFAULT_TOP_N: usize = 5;

const SEPARATOR: &str = "----------------------------------------";

/// Split a cell into CWE tokens, dropping the "no weakness" marker
pub fn tokenize(cell: &str) -> impl Iterator<Item = &str> {
    cell.split_whitespace().filter(|t| *t != NO_WEAKNESS)
}

/// Numeric ids compare as numbers; they sort before non-numeric tokens
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Occurrence counts of CWE tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CweTally {
    counts: HashMap<String, usize>,
}

impl CweTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every token of every present cell
    pub fn extend_cells(&mut self, cells: &[Option<String>]) {
        for cell in cells.iter().flatten() {
            for token in tokenize(cell) {
                *self.counts.entry(token.to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn from_cells(cells: &[Option<String>]) -> Self {
        let mut tally = Self::new();
        tally.extend_cells(cells);
        tally
    }

    pub fn count(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Sum of all occurrences
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct ids
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Ids by descending count, ties in natural order
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> =
            self.counts.iter().map(|(id, c)| (id.clone(), *c)).collect();
        ranked.sort_by(|(a_id, a_c), (b_id, b_c)| b_c.cmp(a_c).then_with(|| natural_cmp(a_id, b_id)));
        ranked
    }

    /// Distinct numeric ids in ascending order
    pub fn ordered_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.counts.keys().filter_map(|id| id.parse().ok()).collect();
        ids.sort_unstable();
        ids
    }
}

/// All-ids view of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnFrequency {
    pub column: String,
    pub ranked: Vec<(String, usize)>,
    pub ordered_ids: Vec<u64>,
    pub total: usize,
    pub distinct_types: usize,
}

/// Target-category view of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFrequency {
    pub column: String,
    /// Count of each target id, in ascending id order
    pub selected: Vec<(String, usize)>,
    pub others: usize,
    pub total: usize,
    pub distinct_types: usize,
}

/// One row of the pooled ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub id: String,
    pub count: usize,
    /// Share of all pooled occurrences, in percent
    pub share_pct: f64,
}

/// Pooled view over a column family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PooledFrequency {
    pub columns: Vec<String>,
    pub entries: Vec<FrequencyEntry>,
    pub total: usize,
    /// Requested size of the top list
    pub top_n: usize,
    /// `CWE-{id}` labels of the most frequent entries
    pub top: Vec<String>,
}

fn cwe_columns(table: &Table) -> Vec<&str> {
    table.columns_containing(CWE_ID_FRAGMENT).collect()
}

fn column_tally(table: &Table, column: &str) -> CweTally {
    table.column(column).map(CweTally::from_cells).unwrap_or_default()
}

/// Rank every id found in each CWE-id column
pub fn count_all_cwe_ids(table: &Table) -> Vec<ColumnFrequency> {
    cwe_columns(table)
        .into_iter()
        .map(|column| {
            let tally = column_tally(table, column);
            ColumnFrequency {
                column: column.to_string(),
                ranked: tally.ranked(),
                ordered_ids: tally.ordered_ids(),
                total: tally.total(),
                distinct_types: tally.distinct(),
            }
        })
        .collect()
}

/// Count each target id per CWE-id column and fold the rest into `others`
pub fn count_selected_cwe_ids(table: &Table, targets: &[&str]) -> Vec<SelectedFrequency> {
    let mut sorted_targets: Vec<&str> = targets.to_vec();
    sorted_targets.sort_by(|a, b| natural_cmp(a, b));
    sorted_targets.dedup();

    cwe_columns(table)
        .into_iter()
        .map(|column| {
            let tally = column_tally(table, column);
            let selected: Vec<(String, usize)> = sorted_targets
                .iter()
                .map(|id| (id.to_string(), tally.count(id)))
                .collect();
            let others = tally
                .counts
                .iter()
                .filter(|(id, _)| !sorted_targets.contains(&id.as_str()))
                .map(|(_, c)| c)
                .sum();
            SelectedFrequency {
                column: column.to_string(),
                selected,
                others,
                total: tally.total(),
                distinct_types: tally.distinct(),
            }
        })
        .collect()
}

/// Pool every column whose name contains `considered` and rank the ids
pub fn most_frequent_cwe(table: &Table, considered: &str, top_n: usize) -> PooledFrequency {
    let columns: Vec<String> = table
        .columns_containing(considered)
        .map(str::to_string)
        .collect();

    let mut tally = CweTally::new();
    for column in &columns {
        if let Some(cells) = table.column(column) {
            tally.extend_cells(cells);
        }
    }

    let total = tally.total();
    let entries: Vec<FrequencyEntry> = tally
        .ranked()
        .into_iter()
        .map(|(id, count)| FrequencyEntry {
            share_pct: count as f64 / total as f64 * 100.0,
            id,
            count,
        })
        .collect();
    let top = entries
        .iter()
        .take(top_n)
        .map(|e| format!("CWE-{}", e.id))
        .collect();

    PooledFrequency {
        columns,
        entries,
        total,
        top_n,
        top,
    }
}

impl ColumnFrequency {
    pub fn to_report_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Column: {}\n", self.column));
        for (id, count) in &self.ranked {
            out.push_str(&format!("{}: {}\n", id, count));
        }
        out.push_str(&format!("Total CWE per column {}: {}\n", self.column, self.total));
        out.push_str(&format!("CWE ordered by ID: {:?}\n", self.ordered_ids));
        out.push_str(&format!("Total CWE types: {}\n", self.distinct_types));
        out.push_str(SEPARATOR);
        out.push('\n');
        out
    }
}

impl SelectedFrequency {
    pub fn to_report_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Column: {}\n", self.column));
        for (id, count) in &self.selected {
            out.push_str(&format!("{}: {}\n", id, count));
        }
        out.push_str(&format!("Others: {}\n", self.others));
        out.push_str(&format!("Total CWE per column {}: {}\n", self.column, self.total));
        out.push_str(&format!(
            "Total CWE types (including Others): {}\n",
            self.distinct_types
        ));
        out.push_str(SEPARATOR);
        out.push('\n');
        out
    }
}

impl PooledFrequency {
    pub fn to_report_string(&self) -> String {
        let mut out = String::from("Ordered list of the most frequent CWE:\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "{}: {} occurrences, {:.2}% general frequency\n",
                entry.id, entry.count, entry.share_pct
            ));
        }
        out.push_str(SEPARATOR);
        out.push('\n');
        out.push_str(&format!("Top {} CWE: {}\n", self.top_n, self.top.join(", ")));
        out
    }
}
