//! Time series diagnostics.

pub mod autocorrelation;

pub use autocorrelation::{
    acf, autocorrelation, correlation_diagnostics, pacf, partial_autocorrelation,
    CorrelationDiagnostics,
};
