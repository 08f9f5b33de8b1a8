//! The load → clean → test → difference → inspect → fit pipeline.
//!
//! Each stage is a plain function over the previous stage's output. A
//! [`Pipeline`] runs the stages a set of [`Selections`] asks for and collects
//! their outcomes in a [`PipelineReport`]; a [`ModelSession`] tracks repeated
//! model fits on one series.
//!
//! # Example
//!
//! ```no_run
//! use commodity_arima::models::arima::ARIMASpec;
//! use commodity_arima::pipeline::{Pipeline, PipelineConfig, Selections};
//!
//! let bytes = std::fs::read("CMO-Historical-Data-Monthly.xlsx").unwrap();
//! let selections = Selections::new("Monthly Prices", "CRUDE_BRENT")
//!     .with_differencing(true)
//!     .with_order(ARIMASpec::new(2, 1, 0));
//!
//! let report = Pipeline::new(PipelineConfig::default())
//!     .run(bytes, &selections)
//!     .unwrap();
//! if let Some(Ok(model)) = &report.model {
//!     println!("MAPE {:.2}%", model.mape());
//! }
//! ```

mod config;
mod run;
mod session;
mod stages;

pub use config::{OrderSource, PipelineConfig, Selections, DEFAULT_ACF_LAGS, DEFAULT_HORIZON};
pub use run::{Pipeline, PipelineReport};
pub use session::{ModelSession, SessionState};
pub use stages::{
    clean, difference_and_test, difference_until_stationary, fit_and_forecast,
    inspect_correlation, load, test_stationarity, DifferencingReport, Evaluation,
    IterativeDifferencing, ModelReport, StationarityReport,
};
