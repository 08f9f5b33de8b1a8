//! # commodity-arima
//!
//! Exploration and forecasting of monthly commodity prices with ARIMA models.
//!
//! A workbook of price observations (such as the World Bank "Pink Sheet") is
//! loaded, cleaned into a month-indexed table, tested for stationarity with
//! the augmented Dickey-Fuller test, optionally differenced and inspected
//! through ACF/PACF diagnostics, then modelled with ARIMA: an evaluation fit
//! against the last twelve months and a full-history forecast of the next
//! twelve.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::arima::{ARIMASpec, ARIMA};
    pub use crate::models::Forecaster;
    pub use crate::pipeline::{
        ModelSession, OrderSource, Pipeline, PipelineConfig, PipelineReport, Selections,
    };
    pub use crate::utils::{calculate_metrics, mape, quantile_normal, AccuracyMetrics};
    pub use crate::validation::{adf_test, AdfConfig, Stationarity, StationarityResult};
}
