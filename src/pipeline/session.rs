//! Model-fitting session: `Idle -> Configuring -> Fitting -> Forecasted | Failed`.

use log::debug;

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::ARIMASpec;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::stages::{fit_and_forecast, ModelReport};

/// Where a [`ModelSession`] is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Configuring(ARIMASpec),
    Fitting(ARIMASpec),
    Forecasted(Box<ModelReport>),
    Failed {
        order: ARIMASpec,
        error: ForecastError,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Configuring(_) => "configuring",
            SessionState::Fitting(_) => "fitting",
            SessionState::Forecasted(_) => "forecasted",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// Fits one series with successively chosen orders.
///
/// Choosing a new order discards the previous result.
#[derive(Debug, Clone)]
pub struct ModelSession {
    series: TimeSeries,
    config: PipelineConfig,
    state: SessionState,
}

impl ModelSession {
    pub fn new(series: TimeSeries, config: PipelineConfig) -> Self {
        Self {
            series,
            config,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// Select an order, dropping any earlier fit or failure.
    pub fn configure(&mut self, order: ARIMASpec) {
        if !matches!(self.state, SessionState::Idle) {
            debug!("discarding {} session state", self.state.name());
        }
        self.state = SessionState::Configuring(order);
    }

    /// Return to `Idle`.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Fit the configured order.
    ///
    /// # Errors
    /// [`ForecastError::InvalidParameter`] unless an order is configured and
    /// not yet fitted; otherwise the fit's own error, which also moves the
    /// session to `Failed`.
    pub fn fit(&mut self) -> Result<&ModelReport> {
        let order = match self.state {
            SessionState::Configuring(order) => order,
            ref other => {
                return Err(ForecastError::InvalidParameter(format!(
                    "cannot fit from the {} state; configure an order first",
                    other.name()
                )))
            }
        };

        self.state = SessionState::Fitting(order);
        self.state = match fit_and_forecast(&self.series, order, &self.config) {
            Ok(report) => SessionState::Forecasted(Box::new(report)),
            Err(error) => SessionState::Failed { order, error },
        };

        match &self.state {
            SessionState::Forecasted(report) => Ok(report.as_ref()),
            SessionState::Failed { error, .. } => Err(error.clone()),
            _ => Err(ForecastError::ComputationError(
                "session left the fitting state unresolved".into(),
            )),
        }
    }

    /// The latest successful fit.
    pub fn report(&self) -> Option<&ModelReport> {
        match &self.state {
            SessionState::Forecasted(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}
