//! Tabular Normalizer
//!
//! Turns an uploaded spreadsheet into a clean [`Dataset`]:
//! 1. Read the first sheet (workbooks) or the whole file (CSV)
//! 2. Clean column names
//! 3. Infer numeric columns
//! 4. Rewrite mostly-date text columns as `YYYY-MM-DD`
//!
//! Failures never escape [`normalize_file`]; they are logged and produce an
//! empty dataset.

use super::dates::{format_date, parse_date};
use super::reader::{read_table, RawTable};
use super::{Cell, Column, ColumnKind, Dataset, TabularFormat};
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_]").unwrap();
}

/// Normalize a spreadsheet file. An empty dataset means normalization failed
/// (or the file held no rows), never a partially cleaned table.
pub fn normalize_file(path: &Path) -> Dataset {
    match try_normalize_file(path) {
        Ok(dataset) => dataset,
        Err(e) => {
            warn!("Error cleaning file {}: {}", path.display(), e);
            Dataset::empty()
        }
    }
}

/// Fallible form of [`normalize_file`].
pub fn try_normalize_file(path: &Path) -> Result<Dataset> {
    let format = TabularFormat::from_path(path);
    let Some(raw) = read_table(path, format)? else {
        info!("Workbook {} has no sheets", path.display());
        return Ok(Dataset::empty());
    };

    let dataset = normalize_table(raw);
    info!(
        "Normalized {}: {} rows, {} columns",
        path.display(),
        dataset.row_count(),
        dataset.columns().len()
    );
    Ok(dataset)
}

/// Clean names, infer kinds and convert date-like text columns.
pub fn normalize_table(raw: RawTable) -> Dataset {
    if raw.headers.is_empty() || raw.rows.is_empty() {
        return Dataset::empty();
    }

    let names = clean_column_names(&raw.headers);
    let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(raw.rows.len()); names.len()];
    for row in raw.rows {
        for (index, cell) in row.into_iter().enumerate().take(names.len()) {
            columns[index].push(cell);
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| {
            let column = infer_column(name, values);
            if column.kind == ColumnKind::Text {
                convert_date_column(column)
            } else {
                column
            }
        })
        .collect();

    Dataset::new(columns)
}

/// Trim, substitute `unnamed_col_<i>` for empty or duplicate names, and
/// replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn clean_column_names(headers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let trimmed = header.trim();
            let base = if trimmed.is_empty() {
                format!("unnamed_col_{}", index)
            } else {
                trimmed.to_string()
            };
            let mut name = INVALID_NAME_CHARS.replace_all(&base, "_").into_owned();

            if seen.contains(&name) {
                name = format!("unnamed_col_{}", index);
                while seen.contains(&name) {
                    name.push('_');
                }
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// A column is numeric when every non-missing value reads as a number.
fn infer_column(name: String, values: Vec<Cell>) -> Column {
    let all_numeric = values.iter().all(|cell| match cell {
        Cell::Missing | Cell::Number(_) => true,
        Cell::Text(s) => s.trim().parse::<f64>().is_ok(),
    });
    let has_values = values.iter().any(|c| !c.is_missing());

    if all_numeric && has_values {
        let values = values
            .into_iter()
            .map(|cell| match cell {
                Cell::Text(s) => s.trim().parse::<f64>().map(Cell::Number).unwrap_or(Cell::Missing),
                other => other,
            })
            .collect();
        return Column { name, kind: ColumnKind::Numeric, values };
    }

    let values = values
        .into_iter()
        .map(|cell| match cell {
            Cell::Number(n) => Cell::Text(super::format_number(n)),
            other => other,
        })
        .collect();
    Column { name, kind: ColumnKind::Text, values }
}

/// Rewrite a text column as dates when strictly more than half of its
/// non-missing values parse as dates. Values that do not parse become missing.
pub fn convert_date_column(column: Column) -> Column {
    let non_missing = column.non_missing();
    if non_missing == 0 {
        return column;
    }

    let parsed: Vec<Option<chrono::NaiveDate>> = column
        .values
        .iter()
        .map(|cell| cell.as_text().and_then(parse_date))
        .collect();
    let parsed_count = parsed.iter().filter(|d| d.is_some()).count();

    if parsed_count * 2 <= non_missing {
        return column;
    }

    debug!(
        "Column '{}' converted to dates ({}/{} values parsed)",
        column.name, parsed_count, non_missing
    );
    Column {
        name: column.name,
        kind: ColumnKind::Date,
        values: parsed
            .into_iter()
            .map(|d| d.map(|d| Cell::Text(format_date(d))).unwrap_or(Cell::Missing))
            .collect(),
    }
}
