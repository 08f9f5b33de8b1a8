//! One end-to-end pass over an uploaded workbook.

use log::{debug, info, warn};

use crate::core::TimeSeries;
use crate::error::Result;
use crate::features::CorrelationDiagnostics;
use crate::io::Workbook;
use crate::pipeline::config::{PipelineConfig, Selections};
use crate::pipeline::stages::{
    clean, difference_and_test, fit_and_forecast, inspect_correlation, test_stationarity,
    DifferencingReport, ModelReport, StationarityReport,
};
use crate::transform::CleanedTable;

/// Everything one run produced.
///
/// Stages after cleaning record their own failures so earlier outputs stay
/// available.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Sheets in the workbook, for the next selection.
    pub sheet_names: Vec<String>,
    pub table: CleanedTable,
    pub preview: CleanedTable,
    pub plot_series: Result<TimeSeries>,
    pub test_series: Result<TimeSeries>,
    pub stationarity: Result<StationarityReport>,
    /// Present when differencing was requested.
    pub differencing: Option<Result<DifferencingReport>>,
    /// Present when the differenced series tested stationary.
    pub correlation: Option<Result<CorrelationDiagnostics>>,
    /// Present when an order was selected.
    pub model: Option<Result<ModelReport>>,
}

/// The load-to-forecast pipeline with fixed settings.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Sheet names of a workbook, before any sheet is chosen.
    pub fn sheet_names(bytes: Vec<u8>) -> Result<Vec<String>> {
        Ok(Workbook::from_bytes(bytes)?.sheet_names())
    }

    /// Run every selected stage on `bytes`.
    ///
    /// # Errors
    /// Only loading and cleaning failures end the run; they leave nothing to
    /// show.
    pub fn run(&self, bytes: Vec<u8>, selections: &Selections) -> Result<PipelineReport> {
        let config = &self.config;

        let mut workbook = Workbook::from_bytes(bytes)?;
        let sheet_names = workbook.sheet_names();
        let raw = workbook.read_sheet(&selections.sheet, &config.load)?;
        let table = clean(&raw, &config.clean)?;
        let preview = table.head(config.preview_rows);

        let plot_series = table.series(&selections.plot_column);
        let test_series = table.series(&selections.test_column);
        let stationarity = test_series
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|s| test_stationarity(s, &config.adf, config.significance));
        log_failure("stationarity test", &stationarity);

        let differencing = selections.difference.then(|| {
            let report = test_series
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|s| difference_and_test(s, &config.adf, config.significance));
            log_failure("differencing", &report);
            report
        });

        let correlation = match &differencing {
            Some(Ok(report)) if report.stationarity.is_stationary() => {
                let diagnostics = inspect_correlation(&report.differenced, config.acf_lags);
                log_failure("correlation diagnostics", &diagnostics);
                Some(diagnostics)
            }
            _ => None,
        };

        let model = selections.order.map(|order| {
            let report = test_series
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|s| fit_and_forecast(s, order, config));
            log_failure("model fit", &report);
            report
        });

        info!(
            "pipeline run on sheet '{}' finished: {} observations",
            selections.sheet,
            table.len()
        );

        Ok(PipelineReport {
            sheet_names,
            table,
            preview,
            plot_series,
            test_series,
            stationarity,
            differencing,
            correlation,
            model,
        })
    }
}

fn log_failure<T>(stage: &str, result: &Result<T>) {
    match result {
        Ok(_) => debug!("{stage} succeeded"),
        Err(e) => warn!("{stage} failed: {e}"),
    }
}
