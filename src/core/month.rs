//! Month-granularity timestamps.
//!
//! Every timestamp produced by this crate is the first instant of a calendar
//! month in UTC, so month arithmetic never has to deal with day overflow.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Months, TimeZone, Timelike, Utc};

/// First instant of the given month, or `None` for an impossible date.
pub fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

/// Parse a period label coded as `YYYYMmm` (e.g. `1960M01`).
///
/// The month part may be one or two digits. Surrounding whitespace is ignored.
pub fn parse_monthly_label(label: &str) -> Option<DateTime<Utc>> {
    let label = label.trim();
    let (year, month) = label.split_once(&['M', 'm'][..])?;

    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    if !year.bytes().all(|b| b.is_ascii_digit()) || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    month_start(year, month)
}

/// Parse a freeform annual label (`1960`, `1960.0`) to January of that year.
pub fn parse_annual_label(label: &str) -> Option<DateTime<Utc>> {
    let label = label.trim();
    let digits = label.strip_suffix(".0").unwrap_or(label);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    month_start(digits.parse().ok()?, 1)
}

/// Whether `ts` sits exactly on a month boundary.
pub fn is_month_start(ts: &DateTime<Utc>) -> bool {
    ts.day() == 1 && ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0
}

/// Roll `ts` forward to the next month start, unless it already is one.
pub fn roll_to_month_start(ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if is_month_start(&ts) {
        return Ok(ts);
    }
    let current = month_start(ts.year(), ts.month()).ok_or_else(|| {
        ForecastError::TimestampError(format!("cannot truncate {} to its month", ts))
    })?;
    add_months(current, 1)
}

/// Shift a timestamp by `n` calendar months.
pub fn add_months(ts: DateTime<Utc>, n: u32) -> Result<DateTime<Utc>> {
    ts.checked_add_months(Months::new(n))
        .ok_or_else(|| ForecastError::TimestampError(format!("{} + {} months overflows", ts, n)))
}

/// `periods` consecutive month starts beginning at (or rolled forward from) `start`.
pub fn monthly_range(start: DateTime<Utc>, periods: usize) -> Result<Vec<DateTime<Utc>>> {
    let first = roll_to_month_start(start)?;
    (0..periods)
        .map(|i| {
            let offset = u32::try_from(i).map_err(|_| {
                ForecastError::InvalidParameter(format!("{} periods is too many", periods))
            })?;
            add_months(first, offset)
        })
        .collect()
}

/// Format a month start as `YYYY-MM`.
pub fn format_month(ts: &DateTime<Utc>) -> String {
    format!("{:04}-{:02}", ts.year(), ts.month())
}
