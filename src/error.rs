//! Error types for the commodity-arima library.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading, cleaning, testing or modelling a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The workbook could not be read or the requested sheet is unusable.
    #[error("parse error: {0}")]
    Parse(String),

    /// No period label in the sheet could be turned into a timestamp.
    #[error("date parse error: {0}")]
    DateParse(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// ARIMA estimation failed for the given order.
    #[error("failed to fit ARIMA{order}: {source}")]
    ModelFit {
        order: String,
        #[source]
        source: Box<ForecastError>,
    },

    /// The selected column does not exist in the cleaned table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl ForecastError {
    /// Wrap an estimation failure for the order `(p, d, q)`.
    pub fn model_fit(p: usize, d: usize, q: usize, source: ForecastError) -> Self {
        ForecastError::ModelFit {
            order: format!("({}, {}, {})", p, d, q),
            source: Box::new(source),
        }
    }

    /// Whether this error should end the current run rather than a single stage.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ForecastError::Parse(_) | ForecastError::DateParse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::Parse("sheet 'Monthly' not found".to_string());
        assert_eq!(err.to_string(), "parse error: sheet 'Monthly' not found");

        let err = ForecastError::InsufficientData { needed: 13, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 13, got 5"
        );

        let err = ForecastError::ColumnNotFound("Brent".to_string());
        assert_eq!(err.to_string(), "column not found: Brent");

        let err = ForecastError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");
    }

    #[test]
    fn model_fit_wraps_source() {
        let err = ForecastError::model_fit(
            2,
            1,
            0,
            ForecastError::InsufficientData { needed: 5, got: 3 },
        );
        assert_eq!(
            err.to_string(),
            "failed to fit ARIMA(2, 1, 0): insufficient data: need at least 5, got 3"
        );
        let source = err.source().map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("insufficient data: need at least 5, got 3")
        );
    }

    #[test]
    fn only_load_errors_are_fatal() {
        assert!(ForecastError::Parse("bad".into()).is_fatal());
        assert!(ForecastError::DateParse("bad".into()).is_fatal());
        assert!(!ForecastError::InsufficientData { needed: 1, got: 0 }.is_fatal());
        assert!(!ForecastError::model_fit(0, 0, 0, ForecastError::EmptyData).is_fatal());
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::EmptyData;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
