//! The pipeline stages: each takes the previous stage's output and returns a
//! new value, so any stage can be run and tested on its own.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::core::month::{add_months, monthly_range};
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::features::{correlation_diagnostics, CorrelationDiagnostics};
use crate::io::{load_workbook, LoadOptions, RawTable};
use crate::models::arima::{first_difference, ARIMASpec, ARIMA};
use crate::models::Forecaster;
use crate::pipeline::config::PipelineConfig;
use crate::transform::{self, CleanOptions, CleanedTable};
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::validation::{adf_test, AdfConfig, Stationarity, StationarityResult};

/// Read `sheet` from workbook bytes.
pub fn load(bytes: Vec<u8>, sheet: &str, options: &LoadOptions) -> Result<RawTable> {
    load_workbook(bytes, sheet, options)
}

/// Turn a loaded sheet into a time-indexed table.
pub fn clean(raw: &RawTable, options: &CleanOptions) -> Result<CleanedTable> {
    let table = transform::clean(raw, options)?;
    info!(
        "cleaned {} observations across {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// ADF outcome with the verdict at the configured significance level.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityReport {
    pub result: StationarityResult,
    pub verdict: Stationarity,
    pub significance: f64,
    /// Whether the tested series had already been differenced.
    pub differenced: bool,
}

impl StationarityReport {
    pub fn is_stationary(&self) -> bool {
        self.verdict.is_stationary()
    }

    /// What to tell the user about this verdict.
    pub fn recommendation(&self) -> String {
        let alpha = self.significance;
        match (self.verdict, self.differenced) {
            (Stationarity::Stationary, false) => {
                format!("The series is stationary (p-value < {alpha}).")
            }
            (Stationarity::NonStationary, false) => format!(
                "The series is not stationary (p-value >= {alpha}). Consider differencing the data."
            ),
            (Stationarity::Stationary, true) => {
                format!("The differenced series is stationary (p-value < {alpha}).")
            }
            (Stationarity::NonStationary, true) => {
                "The series is still not stationary. Further transformations may be needed."
                    .to_string()
            }
        }
    }
}

fn check_significance(significance: f64) -> Result<()> {
    if significance > 0.0 && significance < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "significance must lie in (0, 1), got {significance}"
        )))
    }
}

fn stationarity_report(
    series: &TimeSeries,
    config: &AdfConfig,
    significance: f64,
    differenced: bool,
) -> Result<StationarityReport> {
    check_significance(significance)?;
    let result = adf_test(series.values(), config)?;
    let verdict = result.classify(significance);
    info!(
        "ADF on {}{}: statistic {:.4}, p-value {:.4e} -> {}",
        series.label().unwrap_or("series"),
        if differenced { " (differenced)" } else { "" },
        result.statistic,
        result.p_value,
        verdict.label()
    );
    Ok(StationarityReport {
        result,
        verdict,
        significance,
        differenced,
    })
}

/// Run the ADF test on `series`.
pub fn test_stationarity(
    series: &TimeSeries,
    config: &AdfConfig,
    significance: f64,
) -> Result<StationarityReport> {
    stationarity_report(series, config, significance, false)
}

/// A first-differenced series and its stationarity verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencingReport {
    pub differenced: TimeSeries,
    pub stationarity: StationarityReport,
}

/// Difference `series` once and re-test it.
pub fn difference_and_test(
    series: &TimeSeries,
    config: &AdfConfig,
    significance: f64,
) -> Result<DifferencingReport> {
    let differenced = first_difference(series)?;
    let stationarity = stationarity_report(&differenced, config, significance, true)?;
    Ok(DifferencingReport {
        differenced,
        stationarity,
    })
}

/// Result of repeated differencing.
#[derive(Debug, Clone, PartialEq)]
pub struct IterativeDifferencing {
    /// The series after `order` differences.
    pub series: TimeSeries,
    pub order: usize,
    /// Verdict for `series`; may still be non-stationary at the cap.
    pub stationarity: StationarityReport,
}

/// Difference until the ADF test declares the series stationary, at most
/// `max_order` times.
pub fn difference_until_stationary(
    series: &TimeSeries,
    config: &AdfConfig,
    significance: f64,
    max_order: usize,
) -> Result<IterativeDifferencing> {
    let mut current = series.clone();
    let mut order = 0;
    let mut stationarity = stationarity_report(&current, config, significance, false)?;

    while !stationarity.is_stationary() && order < max_order {
        current = first_difference(&current)?;
        order += 1;
        stationarity = stationarity_report(&current, config, significance, true)?;
    }

    if !stationarity.is_stationary() {
        warn!("series is still non-stationary after {order} differences");
    }
    Ok(IterativeDifferencing {
        series: current,
        order,
        stationarity,
    })
}

/// ACF/PACF diagnostics of `series`.
pub fn inspect_correlation(series: &TimeSeries, lags: usize) -> Result<CorrelationDiagnostics> {
    let diagnostics = correlation_diagnostics(series.values(), lags)?;
    debug!(
        "significant ACF lags {:?}, PACF lags {:?}",
        diagnostics.significant_acf_lags(),
        diagnostics.significant_pacf_lags()
    );
    Ok(diagnostics)
}

/// Forecast of the withheld tail compared with what actually happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Index of the first withheld observation.
    pub split_index: usize,
    /// The withheld observations.
    pub actual: TimeSeries,
    /// Forecast for the withheld timestamps.
    pub forecast: Forecast,
    pub metrics: AccuracyMetrics,
}

/// Outcome of the model stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    /// Order of the evaluation fit.
    pub order: ARIMASpec,
    /// Order of the full-history refit.
    pub final_order: ARIMASpec,
    pub evaluation: Evaluation,
    /// The full series on a clean month-start index.
    pub history: TimeSeries,
    /// Forecast for the months following `history`.
    pub future: Forecast,
    pub final_aic: Option<f64>,
    pub final_bic: Option<f64>,
}

impl ModelReport {
    pub fn mape(&self) -> f64 {
        self.evaluation.metrics.mape
    }

    /// `(timestamp, prediction)` rows of the future forecast.
    pub fn forecast_table(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.future.table()
    }
}

fn fit_model(series: &TimeSeries, order: ARIMASpec, config: &PipelineConfig) -> Result<(ARIMA, Forecast)> {
    let wrap = |e| ForecastError::model_fit(order.p, order.d, order.q, e);
    let mut model = ARIMA::from_spec(order);
    model.fit(series).map_err(wrap)?;
    let forecast = model
        .predict_with_intervals(config.horizon, config.interval_level)
        .map_err(wrap)?;
    Ok((model, forecast))
}

/// Evaluate `order` on the last `horizon` observations, then refit on the
/// whole series and forecast `horizon` months past its end.
///
/// # Errors
/// * [`ForecastError::InsufficientData`] unless the series is longer than the
///   horizon.
/// * [`ForecastError::ModelFit`] wrapping any estimation failure.
pub fn fit_and_forecast(
    series: &TimeSeries,
    order: ARIMASpec,
    config: &PipelineConfig,
) -> Result<ModelReport> {
    if config.horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be positive".into(),
        ));
    }
    let (train, test) = series.split_last(config.horizon)?;
    debug!(
        "evaluating ARIMA{} on {} training and {} test observations",
        order,
        train.len(),
        test.len()
    );

    let (_, forecast) = fit_model(&train, order, config)?;
    let forecast = forecast.with_timestamps(test.timestamps().to_vec())?;
    let metrics = calculate_metrics(test.values(), forecast.primary())?;
    if metrics.mape_is_finite() {
        info!("ARIMA{} test MAPE {:.2}%", order, metrics.mape);
    } else {
        warn!(
            "ARIMA{} test MAPE is {} (a withheld actual is zero)",
            order, metrics.mape
        );
    }

    let final_order = config.final_order.resolve(order);
    let history = series.reindexed_monthly()?;
    let (final_model, future) = fit_model(&history, final_order, config)?;
    let last = history.last_timestamp().ok_or(ForecastError::EmptyData)?;
    let future = future.with_timestamps(monthly_range(add_months(last, 1)?, config.horizon)?)?;
    info!(
        "refit ARIMA{} on {} observations, forecasting {} months",
        final_order,
        history.len(),
        future.horizon()
    );

    Ok(ModelReport {
        order,
        final_order,
        evaluation: Evaluation {
            split_index: train.len(),
            actual: test,
            forecast,
            metrics,
        },
        history,
        future,
        final_aic: final_model.aic(),
        final_bic: final_model.bic(),
    })
}
