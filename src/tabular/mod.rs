//! Tabular Dataset - normalized spreadsheet data for one request
//!
//! A dataset is an ordered list of named columns. Every column holds values of
//! one kind (numeric, free text, or dates rendered as `YYYY-MM-DD` text).
//! Column names are non-empty, unique, and restricted to `[A-Za-z0-9_]`.

pub mod dates;
pub mod normalize;
pub mod reader;

pub use normalize::{normalize_file, try_normalize_file};

use serde::Serialize;
use std::path::Path;

/// A single cell after reading and type inference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render for prompts and previews; missing cells render empty.
    pub fn render(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Whole numbers print without a trailing `.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// Inferred kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Text,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn non_missing(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }
}

/// Normalized table. An empty dataset means normalization failed or the
/// file held no rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there are no columns or no rows.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count() == 0
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Row-major view of the cells at `row`.
    pub fn row(&self, row: usize) -> Vec<&Cell> {
        self.columns.iter().filter_map(|c| c.values.get(row)).collect()
    }
}

/// Spreadsheet family a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Workbook,
}

impl TabularFormat {
    /// Workbook extensions are matched case-insensitively; everything else is
    /// read as delimited text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xls") | Some("xlsx") => TabularFormat::Workbook,
            _ => TabularFormat::Csv,
        }
    }
}
