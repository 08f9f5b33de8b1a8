//! Spreadsheet workbook loading.
//!
//! A workbook is accepted in any container format `calamine` can detect
//! (xlsx, xlsm, xls, ods). A data sheet is read as a [`RawTable`]: a fixed
//! number of metadata rows is skipped, the next row supplies the column
//! headers, and every following row is one observation.

use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::debug;

use crate::error::{ForecastError, Result};

/// Options controlling how a sheet is turned into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Leading rows (counted from the top of the sheet) holding metadata.
    pub header_rows: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { header_rows: 4 }
    }
}

impl LoadOptions {
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }
}

/// A raw cell value as read from the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view of the cell; text is parsed when it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Missing => None,
        }
    }

    /// Text view of the cell, as the period column needs it.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Number(v) if v.fract() == 0.0 => Some(format!("{}", *v as i64)),
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Missing => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => write!(f, "<NA>"),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Missing,
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Float(v) => Cell::Number(*v),
            Data::String(s) if s.trim().is_empty() => Cell::Missing,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Missing,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// A sheet as loaded: named columns and ordered rows of raw cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table; every row is padded or truncated to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the column called `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// An opened workbook, kept in memory for the duration of one run.
pub struct Workbook {
    sheets: Sheets<Cursor<Vec<u8>>>,
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("sheets", &self.sheets.sheet_names())
            .finish()
    }
}

impl Workbook {
    /// Open a workbook from its raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ForecastError::Parse(format!("could not open workbook: {}", e)))?;
        Ok(Self { sheets })
    }

    /// Names of all sheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Read `sheet` into a table, skipping the configured metadata rows.
    pub fn read_sheet(&mut self, sheet: &str, options: &LoadOptions) -> Result<RawTable> {
        if !self.sheet_names().iter().any(|s| s == sheet) {
            return Err(ForecastError::Parse(format!("sheet '{}' not found", sheet)));
        }
        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|e| ForecastError::Parse(format!("could not read sheet '{}': {}", sheet, e)))?;
        let table = table_from_range(&range, options.header_rows)
            .map_err(|e| match e {
                ForecastError::Parse(msg) => ForecastError::Parse(format!("sheet '{}': {}", sheet, msg)),
                other => other,
            })?;
        debug!(
            "loaded sheet '{}': {} columns, {} rows",
            sheet,
            table.columns().len(),
            table.num_rows()
        );
        Ok(table)
    }
}

/// Open `bytes` and read `sheet` in one step.
pub fn load_workbook(bytes: Vec<u8>, sheet: &str, options: &LoadOptions) -> Result<RawTable> {
    Workbook::from_bytes(bytes)?.read_sheet(sheet, options)
}

fn table_from_range(range: &Range<Data>, header_rows: usize) -> Result<RawTable> {
    // calamine ranges begin at the first used cell, not at A1.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = header_rows.saturating_sub(first_row);

    let mut rows = range.rows().skip(skip);
    let header = rows
        .next()
        .ok_or_else(|| ForecastError::Parse(format!("fewer than {} rows", header_rows + 1)))?;
    let columns = column_names(header);

    let body = rows
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();
    Ok(RawTable::new(columns, body))
}

/// Header cells as unique column names; blanks become `Unnamed: i`.
fn column_names(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (i, cell) in header.iter().enumerate() {
        let base = match Cell::from(cell).as_text() {
            Some(text) => text.trim().to_string(),
            None => format!("Unnamed: {}", i),
        };
        let mut name = base.clone();
        let mut dup = 0;
        while names.contains(&name) {
            dup += 1;
            name = format!("{}.{}", base, dup);
        }
        names.push(name);
    }
    names
}
