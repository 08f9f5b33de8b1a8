//! TimeSeries data structure for a single monthly price column.

use crate::core::month;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// Policy for handling missing values (NaN/Inf).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValuePolicy {
    /// Drop observations with missing values.
    Drop,
    /// Fill with the nearest following valid value; trailing gaps stay missing.
    BackFill,
    /// Return error if missing values found.
    Error,
}

/// A univariate time series with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
}

fn is_missing(v: f64) -> bool {
    v.is_nan() || v.is_infinite()
}

impl TimeSeries {
    /// Create a series, validating that timestamps are strictly increasing.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Attach a column label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Extract observations `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            label: self.label.clone(),
        })
    }

    /// Split into `(train, test)` where `test` holds the last `test_len` observations.
    pub fn split_last(&self, test_len: usize) -> Result<(TimeSeries, TimeSeries)> {
        if self.len() <= test_len {
            return Err(ForecastError::InsufficientData {
                needed: test_len + 1,
                got: self.len(),
            });
        }
        let split = self.len() - test_len;
        Ok((self.slice(0, split)?, self.slice(split, self.len())?))
    }

    /// Same values on a clean month-start index beginning at the first observation.
    ///
    /// Raw period labels may skip months; the model only sees positions, so the
    /// forecast index has to be a regular range it can be extended from.
    pub fn reindexed_monthly(&self) -> Result<TimeSeries> {
        let start = self.first_timestamp().ok_or(ForecastError::EmptyData)?;
        Ok(TimeSeries {
            timestamps: month::monthly_range(start, self.len())?,
            values: self.values.clone(),
            label: self.label.clone(),
        })
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|&v| is_missing(v))
    }

    /// Return a sanitized copy with missing values handled.
    pub fn sanitized(&self, policy: MissingValuePolicy) -> Result<TimeSeries> {
        match policy {
            MissingValuePolicy::Error => {
                if self.has_missing_values() {
                    return Err(ForecastError::MissingValues);
                }
                Ok(self.clone())
            }
            MissingValuePolicy::Drop => {
                let (timestamps, values): (Vec<_>, Vec<_>) = self
                    .timestamps
                    .iter()
                    .zip(&self.values)
                    .filter(|(_, v)| !is_missing(**v))
                    .map(|(&t, &v)| (t, v))
                    .unzip();
                Ok(TimeSeries {
                    timestamps,
                    values,
                    label: self.label.clone(),
                })
            }
            MissingValuePolicy::BackFill => Ok(TimeSeries {
                timestamps: self.timestamps.clone(),
                values: back_fill(&self.values),
                label: self.label.clone(),
            }),
        }
    }
}

/// Replace each missing value with the nearest following valid one.
pub fn back_fill(values: &[f64]) -> Vec<f64> {
    let mut result = values.to_vec();
    let mut next_valid = None;
    for v in result.iter_mut().rev() {
        if is_missing(*v) {
            if let Some(fill) = next_valid {
                *v = fill;
            }
        } else {
            next_valid = Some(*v);
        }
    }
    result
}
