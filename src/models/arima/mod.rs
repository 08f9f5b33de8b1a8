//! ARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - Differencing and its inverse
//! - ARIMA models with user-chosen (p, d, q) orders

mod diff;
mod model;

pub use diff::{difference, first_difference, integrate};
pub use model::{ARIMASpec, ARIMA};
