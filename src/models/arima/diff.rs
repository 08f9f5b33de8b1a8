//! Differencing utilities for ARIMA models.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Apply differencing to a series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series, `d` elements shorter than the input (never
/// shorter than empty).
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.is_empty() {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// First difference of a timestamped series.
///
/// Value `t` becomes `x[t] - x[t-1]`; the first timestamp has no predecessor
/// and is dropped.
pub fn first_difference(series: &TimeSeries) -> Result<TimeSeries> {
    if series.len() < 2 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: series.len(),
        });
    }

    let values = difference(series.values(), 1);
    let timestamps = series.timestamps()[1..].to_vec();
    let differenced = TimeSeries::univariate(timestamps, values)?;
    Ok(match series.label() {
        Some(label) => differenced.with_label(label),
        None => differenced,
    })
}

/// Integrate (reverse differencing) a differenced continuation.
///
/// # Arguments
/// * `differenced` - Values on the `d`-times differenced scale that follow
///   the end of `original`
/// * `original` - The original series (needed for initial values)
/// * `d` - Differencing order used
///
/// # Returns
/// The continuation on the original scale.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();

    // Undo the innermost difference first.
    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .scan(anchor, |acc, &step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }

    result
}
