//! Numerical utilities shared by the tests and models.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{calculate_metrics, mae, mape, rmse, AccuracyMetrics};
pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{normal_cdf, quantile_normal};
