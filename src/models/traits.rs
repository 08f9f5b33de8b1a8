//! Forecaster trait defining the common interface for models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
///
/// # Example
///
/// ```
/// use commodity_arima::models::arima::ARIMA;
/// use commodity_arima::models::Forecaster;
///
/// let model: Box<dyn Forecaster> = Box::new(ARIMA::new(2, 1, 0));
/// assert_eq!(model.name(), "ARIMA");
/// assert!(!model.is_fitted());
/// ```
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with confidence intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        // Default implementation just returns point predictions
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::month::{month_start, monthly_range};
    use crate::models::arima::ARIMA;

    fn make_test_series(n: usize) -> TimeSeries {
        let start = month_start(2010, 1).unwrap();
        let timestamps = monthly_range(start, n).unwrap();
        let values: Vec<f64> = (1..=n).map(|i| i as f64 + (i as f64).sin()).collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    #[test]
    fn trait_object_fit_predict() {
        let mut model: Box<dyn Forecaster> = Box::new(ARIMA::new(1, 1, 0));
        model.fit(&make_test_series(30)).unwrap();
        assert!(model.is_fitted());

        let forecast = model.predict(12).unwrap();
        assert_eq!(forecast.horizon(), 12);
    }

    #[test]
    fn trait_object_with_intervals() {
        let mut model: Box<dyn Forecaster> = Box::new(ARIMA::new(0, 1, 1));
        model.fit(&make_test_series(30)).unwrap();

        let forecast = model.predict_with_intervals(4, 0.95).unwrap();
        assert!(forecast.has_lower());
        assert!(forecast.has_upper());
    }

    #[test]
    fn trait_object_residuals() {
        let mut model: Box<dyn Forecaster> = Box::new(ARIMA::new(1, 0, 0));
        assert!(model.residuals().is_none());

        model.fit(&make_test_series(25)).unwrap();
        assert_eq!(model.residuals().map(<[f64]>::len), Some(25));
    }
}
