//! Table-ready data structures for LOC output.
//!
//! `LocTable` is what every report format is rendered from: console text,
//! CSV and HTML in the CLI all walk the same headers, rows and footer. It
//! only formats numbers into strings; counting happens elsewhere.

use serde::{Deserialize, Serialize};

use crate::counter::CountResult;
use crate::stats::Counters;

/// Column headers after the label column.
pub const VALUE_HEADERS: [&str; 5] = ["LOC", "Comments", "Blank", "Lines", "Code:Comment"];

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (file path or "TOTAL (N files)")
    pub label: String,
    /// Values for each column (as strings, ready for display)
    pub values: Vec<String>,
}

impl TableRow {
    /// Build a row from named counters.
    pub fn from_counters(counters: &Counters) -> Self {
        let counts = &counters.counts;
        TableRow {
            label: counters.name.clone(),
            values: vec![
                counts.code.to_string(),
                counts.comments.to_string(),
                counts.blank.to_string(),
                counts.lines.to_string(),
                counts.code_to_comment_ratio().to_string(),
            ],
        }
    }
}

/// Table-ready LOC data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocTable {
    /// Column headers: [label_header, value headers...]
    pub headers: Vec<String>,
    /// One row per counted file
    pub rows: Vec<TableRow>,
    /// Total row
    pub footer: TableRow,
}

impl LocTable {
    /// Create a LocTable from a CountResult.
    pub fn from_count(result: &CountResult) -> Self {
        let mut headers = vec!["File".to_string()];
        headers.extend(VALUE_HEADERS.iter().map(|h| h.to_string()));

        LocTable {
            headers,
            rows: result.files.iter().map(TableRow::from_counters).collect(),
            footer: TableRow::from_counters(&result.total),
        }
    }

    /// Widest label among rows, footer and header.
    pub fn label_width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.label.chars().count())
            .chain(std::iter::once(self.footer.label.chars().count()))
            .chain(self.headers.first().map(|h| h.chars().count()))
            .max()
            .unwrap_or(0)
    }
}
