//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// Point predictions, optional prediction intervals and an optional time index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
    timestamps: Option<Vec<DateTime<Utc>>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            ..Self::default()
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
            timestamps: None,
        }
    }

    /// Attach the timestamps each step forecasts.
    pub fn with_timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if timestamps.len() != self.point.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.point.len(),
                got: timestamps.len(),
            });
        }
        self.timestamps = Some(timestamps);
        Ok(self)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_lower(&self) -> bool {
        self.lower.is_some()
    }

    pub fn has_upper(&self) -> bool {
        self.upper.is_some()
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// `(timestamp, value)` rows of the forecast table; empty without an index.
    pub fn table(&self) -> Vec<(DateTime<Utc>, f64)> {
        match &self.timestamps {
            Some(ts) => ts.iter().copied().zip(self.point.iter().copied()).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::month::month_start;

    #[test]
    fn forecast_from_values() {
        let f = Forecast::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(f.horizon(), 3);
        assert!(!f.is_empty());
        assert!(!f.has_lower());
        assert!(f.table().is_empty());
    }

    #[test]
    fn forecast_with_intervals() {
        let f = Forecast::from_values_with_intervals(vec![2.0], vec![1.0], vec![3.0]);
        assert_eq!(f.lower(), Some(&[1.0][..]));
        assert_eq!(f.upper(), Some(&[3.0][..]));
    }

    #[test]
    fn forecast_table_pairs_timestamps_and_values() {
        let stamps = vec![month_start(2025, 1).unwrap(), month_start(2025, 2).unwrap()];
        let f = Forecast::from_values(vec![70.0, 71.5])
            .with_timestamps(stamps.clone())
            .unwrap();
        assert_eq!(f.table(), vec![(stamps[0], 70.0), (stamps[1], 71.5)]);
    }

    #[test]
    fn forecast_rejects_mismatched_index() {
        let f = Forecast::from_values(vec![1.0, 2.0]);
        assert!(matches!(
            f.with_timestamps(vec![month_start(2025, 1).unwrap()]),
            Err(ForecastError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }
}
