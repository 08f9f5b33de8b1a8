//! Statistical tests for time series.
//!
//! # Example
//!
//! ```
//! use commodity_arima::validation::{adf_test, AdfConfig, AutoLag, DEFAULT_SIGNIFICANCE};
//!
//! let series: Vec<f64> = (0..60).map(|i| ((i * 37) % 11) as f64).collect();
//! let config = AdfConfig::default()
//!     .with_max_lags(2)
//!     .with_autolag(AutoLag::Fixed);
//! let result = adf_test(&series, &config).unwrap();
//! assert_eq!(result.lags, 2);
//! println!(
//!     "ADF {:.3}, p = {:.4}: {}",
//!     result.statistic,
//!     result.p_value,
//!     result.classify(DEFAULT_SIGNIFICANCE).label()
//! );
//! ```

pub mod stationarity;

pub use stationarity::{
    adf_test, mackinnon_critical_values, mackinnon_p_value, AdfConfig, AutoLag, CriticalValues,
    Stationarity, StationarityResult, DEFAULT_SIGNIFICANCE, MIN_ADF_OBSERVATIONS,
};
