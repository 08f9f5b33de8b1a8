//! Core data structures for monthly time series.

mod forecast;
pub mod month;
mod time_series;

pub use forecast::Forecast;
pub use time_series::{back_fill, MissingValuePolicy, TimeSeries};
