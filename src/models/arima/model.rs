//! ARIMA (Autoregressive Integrated Moving Average) model.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal};

/// Coefficient bound keeping the AR part stationary and the MA part invertible.
const COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ARIMASpec {
    /// Create a new ARIMA specification.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Whether the model estimates a mean term.
    ///
    /// Only undifferenced models carry one; after differencing the mean is
    /// fixed at zero.
    pub fn has_intercept(&self) -> bool {
        self.d == 0
    }

    /// Total number of estimated coefficients.
    pub fn num_params(&self) -> usize {
        self.p
            .saturating_add(self.q)
            .saturating_add(usize::from(self.has_intercept()))
    }

    /// Shortest series this order can be fitted to.
    ///
    /// Saturates, so an order too large for any series always fails the
    /// length check.
    pub fn min_observations(&self) -> usize {
        self.d.saturating_add(self.p.max(self.q)).saturating_add(2)
    }
}

impl Default for ARIMASpec {
    fn default() -> Self {
        Self::new(2, 1, 0)
    }
}

impl fmt::Display for ARIMASpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Parses `p d q`, `p,d,q` or the `(p, d, q)` form `Display` writes.
impl FromStr for ARIMASpec {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            ForecastError::InvalidParameter(format!(
                "ARIMA order must be three non-negative integers, got '{}'",
                s
            ))
        };
        let inner = s.trim();
        let inner = inner
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(inner);
        let parts: Vec<usize> = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse().map_err(|_| invalid()))
            .collect::<Result<_>>()?;
        match parts[..] {
            [p, d, q] => Ok(Self::new(p, d, q)),
            _ => Err(invalid()),
        }
    }
}

/// ARIMA forecasting model.
///
/// ARIMA(p, d, q) combines:
/// - AR(p): Autoregressive component
/// - I(d): Differencing for stationarity
/// - MA(q): Moving average component
///
/// Coefficients are estimated by conditional sum of squares.
#[derive(Debug, Clone)]
pub struct ARIMA {
    spec: ARIMASpec,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    /// Mean of the differenced series; zero unless `d == 0`.
    intercept: f64,
    /// Original series (for integration).
    original: Option<Vec<f64>>,
    differenced: Option<Vec<f64>>,
    /// Fitted values on the differenced scale.
    fitted_diff: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
    converged: bool,
}

impl ARIMA {
    /// Create a new ARIMA model.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q))
    }

    /// Create an unfitted model from a specification.
    pub fn from_spec(spec: ARIMASpec) -> Self {
        Self {
            spec,
            ar_coefficients: vec![],
            ma_coefficients: vec![],
            intercept: 0.0,
            original: None,
            differenced: None,
            fitted_diff: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            bic: None,
            converged: false,
        }
    }

    /// Create an AR(p) model (ARIMA with d=0, q=0).
    pub fn ar(p: usize) -> Self {
        Self::new(p, 0, 0)
    }

    /// Create an MA(q) model (ARIMA with p=0, d=0).
    pub fn ma(q: usize) -> Self {
        Self::new(0, 0, q)
    }

    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Mean squared one-step residual on the differenced scale.
    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    /// AIC, `None` when the residual variance is zero.
    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    /// BIC, `None` when the residual variance is zero.
    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Whether the optimizer met its tolerance during the last fit.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// One-step predictions and residuals on the differenced scale.
    fn filter(
        diff_series: &[f64],
        ar: &[f64],
        ma: &[f64],
        intercept: f64,
    ) -> (Vec<f64>, Vec<f64>) {
        let n = diff_series.len();
        let start = ar.len().max(ma.len());
        let mut fitted = vec![f64::NAN; n];
        let mut residuals = vec![0.0; n];

        for t in start..n {
            let mut pred = intercept;
            for (i, phi) in ar.iter().enumerate() {
                pred += phi * (diff_series[t - 1 - i] - intercept);
            }
            for (i, theta) in ma.iter().enumerate() {
                pred += theta * residuals[t - 1 - i];
            }
            fitted[t] = pred;
            residuals[t] = diff_series[t] - pred;
        }

        (fitted, residuals)
    }

    fn css(diff_series: &[f64], ar: &[f64], ma: &[f64], intercept: f64) -> f64 {
        let start = ar.len().max(ma.len());
        if diff_series.len() <= start {
            return f64::MAX;
        }
        let (_, residuals) = Self::filter(diff_series, ar, ma, intercept);
        residuals[start..].iter().map(|e| e * e).sum()
    }

    /// Split an optimizer point into (intercept, AR, MA).
    fn unpack<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64]) {
        let (intercept, rest) = if self.spec.has_intercept() {
            (params[0], &params[1..])
        } else {
            (0.0, params)
        };
        let (ar, ma) = rest.split_at(self.spec.p);
        (intercept, ar, ma)
    }

    fn estimate_parameters(&mut self, diff_series: &[f64]) -> Result<()> {
        let p = self.spec.p;
        let q = self.spec.q;
        let series_mean = if self.spec.has_intercept() {
            mean(diff_series)
        } else {
            0.0
        };

        if p == 0 && q == 0 {
            self.intercept = series_mean;
            self.ar_coefficients.clear();
            self.ma_coefficients.clear();
            self.converged = true;
            return Ok(());
        }

        let mut initial = Vec::with_capacity(self.spec.num_params());
        let mut bounds = Vec::with_capacity(self.spec.num_params());
        if self.spec.has_intercept() {
            initial.push(series_mean);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for i in 0..p + q {
            let lag = if i < p { i } else { i - p };
            initial.push(0.1 / (lag + 1) as f64);
            bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
        }

        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };

        let result = nelder_mead(
            |params| {
                let (intercept, ar, ma) = self.unpack(params);
                Self::css(diff_series, ar, ma, intercept)
            },
            &initial,
            Some(&bounds),
            config,
        );

        if !result.optimal_value.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "conditional sum of squares is not finite for ARIMA{}",
                self.spec
            )));
        }
        if !result.converged {
            warn!(
                "ARIMA{} optimizer stopped after {} iterations without converging",
                self.spec, result.iterations
            );
        }
        debug!(
            "ARIMA{} css={:.6} after {} iterations",
            self.spec, result.optimal_value, result.iterations
        );

        let (intercept, ar, ma) = self.unpack(&result.optimal_point);
        self.intercept = intercept;
        self.ar_coefficients = ar.to_vec();
        self.ma_coefficients = ma.to_vec();
        self.converged = result.converged;
        Ok(())
    }

    fn calculate_fitted(&mut self, diff_series: &[f64]) {
        let start = self.spec.p.max(self.spec.q);
        let (fitted, residuals) = Self::filter(
            diff_series,
            &self.ar_coefficients,
            &self.ma_coefficients,
            self.intercept,
        );

        let valid = &residuals[start..];
        let n_eff = valid.len() as f64;
        let variance = valid.iter().map(|r| r * r).sum::<f64>() / n_eff;
        self.residual_variance = Some(variance);

        if variance > 0.0 {
            let k = self.spec.num_params() as f64;
            let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());
            self.aic = Some(-2.0 * ll + 2.0 * k);
            self.bic = Some(-2.0 * ll + k * n_eff.ln());
        } else {
            self.aic = None;
            self.bic = None;
        }

        self.fitted_diff = Some(fitted);
        self.residuals = Some(residuals);
    }

    /// MA(infinity) weights of the integrated process, `psi[0] = 1`.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        // phi(B) * (1 - B)^d as a lag polynomial with leading 1.
        let mut poly = vec![1.0];
        poly.extend(self.ar_coefficients.iter().map(|phi| -phi));
        for _ in 0..self.spec.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (i, c) in poly.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c;
            }
            poly = next;
        }

        let mut psi = Vec::with_capacity(horizon);
        for j in 0..horizon {
            let mut w = if j == 0 {
                1.0
            } else {
                self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0)
            };
            for i in 1..=j.min(poly.len() - 1) {
                w -= poly[i] * psi[j - i];
            }
            psi.push(w);
        }
        psi
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::from_spec(ARIMASpec::default())
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let min_len = self.spec.min_observations();

        if values.len() < min_len {
            return Err(ForecastError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        let diff_series = difference(values, self.spec.d);
        self.estimate_parameters(&diff_series)?;
        self.calculate_fitted(&diff_series);

        self.original = Some(values.to_vec());
        self.differenced = Some(diff_series);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        let diff_series = self
            .differenced
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let mut extended_diff = diff_series.clone();
        let mut extended_residuals = residuals.clone();

        for _ in 0..horizon {
            let t = extended_diff.len();
            let mut pred = self.intercept;

            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if t > i {
                    pred += phi * (extended_diff[t - 1 - i] - self.intercept);
                }
            }
            // Future shocks have expectation zero.
            for (i, theta) in self.ma_coefficients.iter().enumerate() {
                if t > i {
                    pred += theta * extended_residuals[t - 1 - i];
                }
            }

            extended_diff.push(pred);
            extended_residuals.push(0.0);
        }

        let forecast_diff = &extended_diff[diff_series.len()..];
        let predictions = integrate(forecast_diff, original, self.spec.d);

        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(format!(
                "ARIMA{} produced a non-finite forecast",
                self.spec
            )));
        }

        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(0.0..1.0).contains(&level) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must lie in [0, 1), got {level}"
            )));
        }

        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let variance = self.residual_variance.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);
        let preds = forecast.primary();

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for (pred, psi) in preds.iter().zip(self.psi_weights(horizon)) {
            cumulative += psi * psi;
            let se = (variance * cumulative).sqrt();
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            preds.to_vec(),
            lower,
            upper,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted_diff.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::month::{month_start, monthly_range};
    use approx::assert_relative_eq;

    fn monthly(values: Vec<f64>) -> TimeSeries {
        let start = month_start(1990, 1).unwrap();
        TimeSeries::univariate(monthly_range(start, values.len()).unwrap(), values).unwrap()
    }

    // ==================== ARIMASpec ====================

    #[test]
    fn arima_spec() {
        let spec = ARIMASpec::new(2, 1, 3);
        assert_eq!(spec.p, 2);
        assert_eq!(spec.d, 1);
        assert_eq!(spec.q, 3);
        assert_eq!(spec.num_params(), 5);
        assert!(!spec.has_intercept());
        assert_eq!(ARIMASpec::new(1, 0, 1).num_params(), 3);
    }

    #[test]
    fn arima_spec_sizes_saturate() {
        assert_eq!(ARIMASpec::new(2, 1, 3).min_observations(), 6);
        assert_eq!(ARIMASpec::new(usize::MAX, 1, 0).min_observations(), usize::MAX);
        assert_eq!(ARIMASpec::new(0, usize::MAX, 0).min_observations(), usize::MAX);
        assert_eq!(ARIMASpec::new(usize::MAX, 0, 1).num_params(), usize::MAX);
    }

    #[test]
    fn arima_rejects_order_larger_than_any_series() {
        let ts = monthly((0..30).map(|i| i as f64).collect());
        let mut model = ARIMA::new(usize::MAX, 1, 0);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData { needed: usize::MAX, got: 30 })
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn arima_spec_display() {
        assert_eq!(ARIMASpec::new(2, 1, 0).to_string(), "(2, 1, 0)");
    }

    #[test]
    fn arima_spec_parses_orders() {
        assert_eq!("2 1 0".parse::<ARIMASpec>(), Ok(ARIMASpec::new(2, 1, 0)));
        assert_eq!("1,1,1".parse::<ARIMASpec>(), Ok(ARIMASpec::new(1, 1, 1)));
        assert_eq!("(0, 1, 2)".parse::<ARIMASpec>(), Ok(ARIMASpec::new(0, 1, 2)));
        let spec = ARIMASpec::new(3, 0, 1);
        assert_eq!(spec.to_string().parse::<ARIMASpec>(), Ok(spec));
    }

    #[test]
    fn arima_spec_rejects_partial_or_signed_orders() {
        for bad in ["", "2", "2 1", "2 1 0 1", "2 -1 0", "a b c", "2.0 1 0"] {
            assert!(
                matches!(bad.parse::<ARIMASpec>(), Err(ForecastError::InvalidParameter(_))),
                "accepted '{}'",
                bad
            );
        }
    }

    #[test]
    fn arima_default_is_210() {
        let model = ARIMA::default();
        assert_eq!(model.spec(), ARIMASpec::new(2, 1, 0));
        assert_eq!(model.name(), "ARIMA");
    }

    // ==================== fitting ====================

    #[test]
    fn arima_basic_fit() {
        let values: Vec<f64> = (0..50)
            .map(|i| 10.0 + 0.5 * i as f64 + (i as f64 * 0.3).sin())
            .collect();
        let ts = monthly(values);

        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&ts).unwrap();

        assert_eq!(model.ar_coefficients().len(), 1);
        assert_eq!(model.ma_coefficients().len(), 1);
        assert_eq!(model.intercept(), 0.0);
        assert!(model.is_fitted());

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.horizon(), 5);
    }

    #[test]
    fn arima_ar1_recovers_positive_coefficient() {
        // y_t = 0.7 * y_{t-1} + e_t
        let mut values = vec![10.0];
        for i in 1..100 {
            values.push(0.7 * values[i - 1] + (i as f64 * 0.1).sin());
        }
        let mut model = ARIMA::ar(1);
        model.fit(&monthly(values)).unwrap();

        assert!(model.ar_coefficients()[0] > 0.3);
        assert!(model.ar_coefficients()[0].abs() <= COEFFICIENT_BOUND);
    }

    #[test]
    fn arima_ma1() {
        let values: Vec<f64> = (0..100).map(|i| 10.0 + (i as f64 * 0.2).sin()).collect();
        let mut model = ARIMA::ma(1);
        model.fit(&monthly(values)).unwrap();

        let forecast = model.predict(5).unwrap();
        assert_eq!(forecast.horizon(), 5);
        assert!(model.intercept() > 9.0 && model.intercept() < 11.0);
    }

    #[test]
    fn arima_with_differencing_follows_trend() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + 2.0 * i as f64).collect();
        let last = *values.last().unwrap();

        let mut model = ARIMA::new(1, 1, 0);
        model.fit(&monthly(values)).unwrap();

        let preds = model.predict(5).unwrap().primary().to_vec();
        assert!(preds[0] > last);
        assert!(preds.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn arima_constant_series_order_000_is_flat() {
        let mut model = ARIMA::new(0, 0, 0);
        model.fit(&monthly(vec![42.0; 20])).unwrap();

        let forecast = model.predict_with_intervals(12, 0.95).unwrap();
        assert_eq!(forecast.horizon(), 12);
        for &v in forecast.primary() {
            assert_relative_eq!(v, 42.0, epsilon = 1e-12);
        }
        assert_eq!(forecast.lower().unwrap(), forecast.primary());
        assert_relative_eq!(model.residual_variance().unwrap(), 0.0, epsilon = 1e-12);
        assert!(model.aic().is_none());
    }

    #[test]
    fn arima_information_criteria() {
        let values: Vec<f64> = (0..50).map(|i| 10.0 + (i as f64 * 0.3).sin()).collect();
        let mut model = ARIMA::new(1, 0, 1);
        model.fit(&monthly(values)).unwrap();

        let aic = model.aic().unwrap();
        let bic = model.bic().unwrap();
        // n_eff = 49 > e^2, so the BIC penalty exceeds the AIC penalty.
        assert!(bic > aic);
    }

    // ==================== intervals ====================

    #[test]
    fn arima_intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..60)
            .map(|i| 20.0 + i as f64 * 0.5 + (i as f64 * 0.7).sin())
            .collect();
        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&monthly(values)).unwrap();

        let forecast = model.predict_with_intervals(6, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        let preds = forecast.primary();

        for i in 0..6 {
            assert!(lower[i] <= preds[i] && preds[i] <= upper[i]);
        }
        let width: Vec<f64> = lower.iter().zip(upper).map(|(l, u)| u - l).collect();
        assert!(width.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn psi_weights_of_random_walk_are_ones() {
        let mut model = ARIMA::new(0, 1, 0);
        model.fit(&monthly((0..20).map(|i| (i % 3) as f64).collect())).unwrap();
        assert_eq!(model.psi_weights(4), vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn arima_rejects_invalid_level() {
        let mut model = ARIMA::new(0, 1, 0);
        model.fit(&monthly((0..20).map(|i| i as f64).collect())).unwrap();
        assert!(matches!(
            model.predict_with_intervals(3, 1.5),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    // ==================== errors ====================

    #[test]
    fn arima_insufficient_data() {
        let mut model = ARIMA::new(2, 1, 1);
        assert!(matches!(
            model.fit(&monthly(vec![1.0, 2.0, 3.0])),
            Err(ForecastError::InsufficientData { needed: 5, got: 3 })
        ));
    }

    #[test]
    fn arima_rejects_missing_values() {
        let mut values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        values[19] = f64::NAN;
        let mut model = ARIMA::new(1, 1, 0);
        assert!(matches!(
            model.fit(&monthly(values)),
            Err(ForecastError::MissingValues)
        ));
    }

    #[test]
    fn arima_requires_fit() {
        let model = ARIMA::new(1, 1, 1);
        assert!(matches!(model.predict(5), Err(ForecastError::FitRequired)));
        assert!(!model.is_fitted());
    }

    #[test]
    fn arima_zero_horizon() {
        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&monthly((0..30).map(|i| i as f64).collect())).unwrap();
        assert_eq!(model.predict(0).unwrap().horizon(), 0);
    }
}
