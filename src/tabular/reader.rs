//! Raw spreadsheet readers
//!
//! Produces a header row plus untyped cells. Type inference and renaming
//! happen in [`super::normalize`].

use super::dates::format_date;
use super::{format_number, Cell, TabularFormat};
use crate::error::{AgentError, Result};
use calamine::{open_workbook, open_workbook_auto, Data, Range, Reader, Sheets, Xls, Xlsx};
use chrono::Timelike;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Spellings read as missing values.
const NA_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Header row plus data rows, before any cleaning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Read the file in the given format. `Ok(None)` means a workbook with no
/// sheets.
pub fn read_table(path: &Path, format: TabularFormat) -> Result<Option<RawTable>> {
    match format {
        TabularFormat::Csv => read_csv(path).map(Some),
        TabularFormat::Workbook => read_workbook(path),
    }
}

/// Text cell, or missing when it is one of the NA spellings.
pub fn text_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if NA_MARKERS.contains(&trimmed) {
        Cell::Missing
    } else {
        Cell::Text(raw.to_string())
    }
}

/// Comma-separated text with a header record. Records longer than the header
/// are a parse error; shorter ones are padded with missing cells.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();
    let mut rows = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            return Err(AgentError::Normalize(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                index + 2,
                record.len()
            )));
        }
        let mut row: Vec<Cell> = record.iter().map(text_cell).collect();
        row.resize(width, Cell::Missing);
        rows.push(row);
    }

    debug!("Read {} rows x {} columns from {}", rows.len(), width, path.display());
    Ok(RawTable { headers, rows })
}

/// First sheet of a workbook; its first row is the header row.
pub fn read_workbook(path: &Path) -> Result<Option<RawTable>> {
    let mut workbook = open_sheets(path)?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let Some(first_sheet) = sheet_names.first() else {
        return Ok(None);
    };

    let range = workbook.worksheet_range(first_sheet).map_err(|e| {
        AgentError::Normalize(format!("Failed to read sheet '{}': {}", first_sheet, e))
    })?;

    debug!("Using sheet '{}' of {} in {}", first_sheet, sheet_names.len(), path.display());
    Ok(Some(range_to_table(&range)))
}

/// Pick the reader from the extension, ignoring case; calamine's own
/// detection only knows lowercase extensions.
fn open_sheets(path: &Path) -> Result<Sheets<BufReader<File>>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let opened = match ext.as_deref() {
        Some("xls") => open_workbook::<Xls<_>, _>(path).map(Sheets::Xls).map_err(|e| e.to_string()),
        Some("xlsx") => open_workbook::<Xlsx<_>, _>(path).map(Sheets::Xlsx).map_err(|e| e.to_string()),
        _ => open_workbook_auto(path).map_err(|e| e.to_string()),
    };
    opened.map_err(|e| AgentError::Normalize(format!("Failed to open workbook {}: {}", path.display(), e)))
}

fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return RawTable::default();
    };

    let headers: Vec<String> = header_row.iter().map(|c| workbook_cell(c).render()).collect();
    let width = headers.len();
    let rows = rows
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(workbook_cell).collect();
            cells.resize(width, Cell::Missing);
            cells
        })
        .collect();

    RawTable { headers, rows }
}

/// Workbook cells keep numbers as numbers. Datetimes become ISO text so the
/// date rule treats them like any other date-looking text.
fn workbook_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Missing,
        Data::Error(_) => Cell::Missing,
        Data::String(s) => text_cell(s),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) if dt.num_seconds_from_midnight() == 0 => Cell::Text(format_date(dt.date())),
            Some(dt) => Cell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Text(format_number(dt.as_f64())),
        },
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
