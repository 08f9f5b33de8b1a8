//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, in percent.
    ///
    /// Infinite or NaN when an actual value is exactly zero; the value is
    /// still reported so callers can show it.
    pub mape: f64,
}

impl AccuracyMetrics {
    pub fn mape_is_finite(&self) -> bool {
        self.mape.is_finite()
    }
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(())
}

/// Mean Absolute Percentage Error: `mean(|(actual - predicted) / actual|) * 100`.
///
/// # Example
/// ```
/// use commodity_arima::utils::metrics::mape;
///
/// let m = mape(&[100.0, 110.0, 90.0], &[95.0, 115.0, 100.0]).unwrap();
/// assert!((m - 7.1549).abs() < 1e-3);
/// ```
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    Ok(100.0 * sum / actual.len() as f64)
}

/// Mean Absolute Error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Ok(sum / actual.len() as f64)
}

/// Root Mean Squared Error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    Ok(mse(actual, predicted).sqrt())
}

fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// # Arguments
/// * `actual` - Actual observed values
/// * `predicted` - Predicted/forecast values
///
/// # Returns
/// `AccuracyMetrics` struct with all computed metrics
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    check_lengths(actual, predicted)?;
    let mse = mse(actual, predicted);

    Ok(AccuracyMetrics {
        mae: mae(actual, predicted)?,
        mse,
        rmse: mse.sqrt(),
        mape: mape(actual, predicted)?,
    })
}
