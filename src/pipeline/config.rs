//! Pipeline configuration and per-run user selections.

use crate::io::LoadOptions;
use crate::models::arima::ARIMASpec;
use crate::transform::CleanOptions;
use crate::validation::{AdfConfig, DEFAULT_SIGNIFICANCE};

/// Observations withheld for evaluation and steps forecast past the data.
pub const DEFAULT_HORIZON: usize = 12;

/// Lags shown in the correlation diagnostics.
pub const DEFAULT_ACF_LAGS: usize = 20;

/// Which order the full-history refit uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSource {
    /// Refit with the order the user chose for the evaluation fit.
    UserOrder,
    /// Refit with a fixed order regardless of the user's choice.
    Fixed(ARIMASpec),
}

impl OrderSource {
    /// The order to refit with, given the user's order.
    pub fn resolve(&self, user: ARIMASpec) -> ARIMASpec {
        match self {
            OrderSource::UserOrder => user,
            OrderSource::Fixed(spec) => *spec,
        }
    }
}

impl Default for OrderSource {
    fn default() -> Self {
        OrderSource::Fixed(ARIMASpec::new(2, 1, 0))
    }
}

/// Settings shared by every run of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub load: LoadOptions,
    pub clean: CleanOptions,
    pub adf: AdfConfig,
    /// p-values strictly below this are declared stationary.
    pub significance: f64,
    /// Test-split length and forecast length.
    pub horizon: usize,
    /// Prediction interval coverage.
    pub interval_level: f64,
    pub acf_lags: usize,
    pub final_order: OrderSource,
    /// Rows shown in the cleaned-data preview.
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            clean: CleanOptions::default(),
            adf: AdfConfig::default(),
            significance: DEFAULT_SIGNIFICANCE,
            horizon: DEFAULT_HORIZON,
            interval_level: 0.95,
            acf_lags: DEFAULT_ACF_LAGS,
            final_order: OrderSource::default(),
            preview_rows: 10,
        }
    }
}

impl PipelineConfig {
    pub fn with_load(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    pub fn with_clean(mut self, clean: CleanOptions) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_adf(mut self, adf: AdfConfig) -> Self {
        self.adf = adf;
        self
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }

    pub fn with_acf_lags(mut self, lags: usize) -> Self {
        self.acf_lags = lags;
        self
    }

    pub fn with_final_order(mut self, source: OrderSource) -> Self {
        self.final_order = source;
        self
    }
}

/// What the user picked for one run.
///
/// The plotted column and the tested column are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub sheet: String,
    pub plot_column: String,
    pub test_column: String,
    /// Difference the tested column once and re-test it.
    pub difference: bool,
    /// Fit and forecast with this order; `None` skips the model stage.
    pub order: Option<ARIMASpec>,
}

impl Selections {
    /// Plot and test `column` of `sheet`, without differencing or fitting.
    pub fn new(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            sheet: sheet.into(),
            plot_column: column.clone(),
            test_column: column,
            difference: false,
            order: None,
        }
    }

    pub fn with_plot_column(mut self, column: impl Into<String>) -> Self {
        self.plot_column = column.into();
        self
    }

    pub fn with_test_column(mut self, column: impl Into<String>) -> Self {
        self.test_column = column.into();
        self
    }

    pub fn with_differencing(mut self, difference: bool) -> Self {
        self.difference = difference;
        self
    }

    pub fn with_order(mut self, order: ARIMASpec) -> Self {
        self.order = Some(order);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.horizon, 12);
        assert_eq!(config.acf_lags, 20);
        assert_eq!(config.significance, 0.05);
        assert_eq!(config.load.header_rows, 4);
        assert_eq!(
            config.final_order,
            OrderSource::Fixed(ARIMASpec::new(2, 1, 0))
        );
    }

    #[test]
    fn order_source_resolution() {
        let user = ARIMASpec::new(1, 1, 1);
        assert_eq!(OrderSource::UserOrder.resolve(user), user);
        assert_eq!(
            OrderSource::default().resolve(user),
            ARIMASpec::new(2, 1, 0)
        );
    }

    #[test]
    fn selections_builders() {
        let s = Selections::new("Monthly Prices", "CRUDE_BRENT")
            .with_plot_column("CRUDE_WTI")
            .with_differencing(true)
            .with_order(ARIMASpec::new(2, 1, 0));
        assert_eq!(s.plot_column, "CRUDE_WTI");
        assert_eq!(s.test_column, "CRUDE_BRENT");
        assert!(s.difference);
        assert_eq!(s.order, Some(ARIMASpec::new(2, 1, 0)));
    }
}
