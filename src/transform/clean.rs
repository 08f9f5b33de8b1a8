//! Cleaning a raw price sheet into monthly series.
//!
//! The steps run in a fixed order, each producing a new table:
//!
//! 1. the first column is renamed to the period label;
//! 2. up to `unit_rows` leading rows are dropped while their period cell is
//!    not a period (unit and code rows under the header);
//! 3. missing-value sentinels become explicit gaps, as does any other text in
//!    a value column;
//! 4. every value column is back-filled (trailing gaps remain);
//! 5. period labels are parsed, rows that fail are dropped;
//! 6. rows are ordered by timestamp and duplicate periods are discarded.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::core::{back_fill, month, MissingValuePolicy, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::io::{Cell, RawTable};

/// Missing-value markers seen in price sheets, including the ellipsis
/// character decoded with the wrong code page.
pub const DEFAULT_SENTINELS: &[&str] = &["\u{2026}", "\u{e2}\u{20ac}\u{a6}", "..."];

/// How period labels are coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFormat {
    /// `YYYYMmm`, e.g. `1960M01`.
    #[default]
    Monthly,
    /// A bare year, e.g. `1960`; mapped to January.
    Annual,
}

impl PeriodFormat {
    pub fn parse(&self, label: &str) -> Option<DateTime<Utc>> {
        match self {
            PeriodFormat::Monthly => month::parse_monthly_label(label),
            PeriodFormat::Annual => month::parse_annual_label(label),
        }
    }
}

/// Options for [`clean`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    /// Name given to the first column.
    pub period_label: String,
    /// Maximum number of leading non-period rows to drop.
    pub unit_rows: usize,
    /// Cell texts treated as missing values.
    pub sentinels: Vec<String>,
    pub period_format: PeriodFormat,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            period_label: "period".to_string(),
            unit_rows: 2,
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            period_format: PeriodFormat::Monthly,
        }
    }
}

impl CleanOptions {
    pub fn with_period_format(mut self, format: PeriodFormat) -> Self {
        self.period_format = format;
        self
    }

    pub fn with_unit_rows(mut self, unit_rows: usize) -> Self {
        self.unit_rows = unit_rows;
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinels.push(sentinel.into());
        self
    }

    fn is_sentinel(&self, text: &str) -> bool {
        let text = text.trim();
        self.sentinels.iter().any(|s| s == text)
    }
}

/// A cleaned sheet: a unique, ascending monthly index and one value column
/// per numeric series.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    period_label: String,
    timestamps: Vec<DateTime<Utc>>,
    periods: Vec<String>,
    columns: Vec<String>,
    /// Column-major: `values[column][row]`.
    values: Vec<Vec<f64>>,
}

impl CleanedTable {
    pub fn period_label(&self) -> &str {
        &self.period_label
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// The raw period labels, aligned with [`timestamps`](Self::timestamps).
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Names of the numeric columns available for plotting and modelling.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Back-filled values of a column; trailing gaps are NaN.
    pub fn column_values(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
            .ok_or_else(|| ForecastError::ColumnNotFound(name.to_string()))
    }

    /// The column as a gap-free series.
    ///
    /// Observations still missing after back-filling (the tail of the sheet)
    /// are dropped.
    pub fn series(&self, name: &str) -> Result<TimeSeries> {
        let values = self.column_values(name)?.to_vec();
        let ts = TimeSeries::univariate(self.timestamps.clone(), values)?.with_label(name);
        let clean = ts.sanitized(MissingValuePolicy::Drop)?;
        if clean.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if clean.len() < ts.len() {
            warn!(
                "column '{}': dropped {} trailing observations with no value",
                name,
                ts.len() - clean.len()
            );
        }
        Ok(clean)
    }

    /// The first `n` rows, for previewing.
    pub fn head(&self, n: usize) -> CleanedTable {
        let n = n.min(self.len());
        CleanedTable {
            period_label: self.period_label.clone(),
            timestamps: self.timestamps[..n].to_vec(),
            periods: self.periods[..n].to_vec(),
            columns: self.columns.clone(),
            values: self.values.iter().map(|v| v[..n].to_vec()).collect(),
        }
    }
}

/// Clean `raw` into a [`CleanedTable`].
pub fn clean(raw: &RawTable, options: &CleanOptions) -> Result<CleanedTable> {
    if raw.columns().is_empty() {
        return Err(ForecastError::Parse("sheet has no columns".to_string()));
    }

    let renamed = rename_period_column(raw, &options.period_label);
    let trimmed = drop_unit_rows(&renamed, options);
    let normalized = normalize_missing(&trimmed, options);
    let filled = back_fill_columns(&normalized);
    index_by_period(&filled, options)
}

fn rename_period_column(raw: &RawTable, label: &str) -> RawTable {
    let mut columns = raw.columns().to_vec();
    columns[0] = label.to_string();
    RawTable::new(columns, raw.rows().to_vec())
}

fn period_text(row: &[Cell]) -> Option<String> {
    row.first().and_then(Cell::as_text)
}

fn drop_unit_rows(table: &RawTable, options: &CleanOptions) -> RawTable {
    let leading = table
        .rows()
        .iter()
        .take(options.unit_rows)
        .take_while(|row| {
            period_text(row)
                .and_then(|label| options.period_format.parse(&label))
                .is_none()
        })
        .count();
    if leading > 0 {
        debug!("dropped {} unit rows below the header", leading);
    }
    RawTable::new(table.columns().to_vec(), table.rows()[leading..].to_vec())
}

fn normalize_missing(table: &RawTable, options: &CleanOptions) -> RawTable {
    let mut sentinels = 0usize;
    let mut non_numeric = 0usize;
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    Cell::Text(text) if options.is_sentinel(text) => {
                        sentinels += 1;
                        Cell::Missing
                    }
                    Cell::Text(text) if col > 0 => match cell.as_f64() {
                        Some(v) => Cell::Number(v),
                        None => {
                            debug!("treating non-numeric cell {:?} as missing", text);
                            non_numeric += 1;
                            Cell::Missing
                        }
                    },
                    other => other.clone(),
                })
                .collect()
        })
        .collect();
    debug!(
        "normalized {} sentinel cells and {} non-numeric cells to missing",
        sentinels, non_numeric
    );
    RawTable::new(table.columns().to_vec(), rows)
}

/// Back-fill each value column; the period column is left untouched.
fn back_fill_columns(table: &RawTable) -> RawTable {
    let width = table.columns().len();
    let mut rows: Vec<Vec<Cell>> = table.rows().to_vec();
    for col in 1..width {
        let column: Vec<f64> = rows
            .iter()
            .map(|r| r[col].as_f64().unwrap_or(f64::NAN))
            .collect();
        for (row, v) in rows.iter_mut().zip(back_fill(&column)) {
            row[col] = if v.is_nan() {
                Cell::Missing
            } else {
                Cell::Number(v)
            };
        }
    }
    RawTable::new(table.columns().to_vec(), rows)
}

fn index_by_period(table: &RawTable, options: &CleanOptions) -> Result<CleanedTable> {
    let mut parsed: Vec<(DateTime<Utc>, String, &[Cell])> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let label = period_text(row)?;
            let ts = options.period_format.parse(&label)?;
            Some((ts, label, row.as_slice()))
        })
        .collect();

    let unparsed = table.num_rows() - parsed.len();
    if parsed.is_empty() {
        return Err(ForecastError::DateParse(format!(
            "none of {} period labels match the {:?} format",
            table.num_rows(),
            options.period_format
        )));
    }
    if unparsed > 0 {
        warn!("dropped {} rows whose period label did not parse", unparsed);
    }

    // Stable sort keeps the first occurrence of a repeated period in front.
    parsed.sort_by_key(|(ts, _, _)| *ts);
    let before = parsed.len();
    parsed.dedup_by_key(|(ts, _, _)| *ts);
    if parsed.len() < before {
        warn!("dropped {} rows with a duplicate period", before - parsed.len());
    }

    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (col, name) in table.columns().iter().enumerate().skip(1) {
        let column: Vec<f64> = parsed
            .iter()
            .map(|(_, _, row)| row[col].as_f64().unwrap_or(f64::NAN))
            .collect();
        if column.iter().all(|v| v.is_nan()) {
            debug!("column '{}' holds no numeric values, skipping", name);
            continue;
        }
        columns.push(name.clone());
        values.push(column);
    }

    debug!(
        "cleaned table: {} observations, {} numeric columns",
        parsed.len(),
        columns.len()
    );

    Ok(CleanedTable {
        period_label: table.columns()[0].clone(),
        timestamps: parsed.iter().map(|(ts, _, _)| *ts).collect(),
        periods: parsed.into_iter().map(|(_, label, _)| label).collect(),
        columns,
        values,
    })
}
