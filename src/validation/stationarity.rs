//! Stationarity testing with the augmented Dickey-Fuller test.
//!
//! The regression includes a constant and no trend:
//!
//! ```text
//! Δy_t = α + β·y_{t-1} + Σ_{i=1..k} γ_i·Δy_{t-i} + ε_t
//! ```
//!
//! The statistic is the t-ratio of β. With automatic lag selection, `k` is the
//! lag count minimizing AIC over `0..=max_lags`, all candidates fitted on the
//! same sample. P-values follow MacKinnon (1994) and critical values MacKinnon
//! (2010), both for the constant-only case with one integrated variable.

use log::debug;

use crate::error::{ForecastError, Result};
use crate::utils::ols::{ols_fit, OLSResult};
use crate::utils::stats::normal_cdf;

/// Fewest observations [`adf_test`] accepts.
pub const MIN_ADF_OBSERVATIONS: usize = 12;

/// Default significance level for the stationary verdict.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// How the number of lagged differences is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoLag {
    /// Minimize AIC over `0..=max_lags`.
    #[default]
    Aic,
    /// Use `max_lags` as is.
    Fixed,
}

/// Configuration for [`adf_test`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdfConfig {
    /// Upper bound on lagged differences; defaults to `ceil(12 * (n/100)^(1/4))`.
    pub max_lags: Option<usize>,
    pub autolag: AutoLag,
}

impl AdfConfig {
    pub fn with_max_lags(mut self, max_lags: usize) -> Self {
        self.max_lags = Some(max_lags);
        self
    }

    pub fn with_autolag(mut self, autolag: AutoLag) -> Self {
        self.autolag = autolag;
        self
    }
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// `(label, value)` pairs, most stringent level first.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("1%", self.cv_1pct),
            ("5%", self.cv_5pct),
            ("10%", self.cv_10pct),
        ]
        .into_iter()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.iter().find(|(l, _)| *l == label).map(|(_, v)| v)
    }
}

/// Verdict of a stationarity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stationarity {
    Stationary,
    NonStationary,
}

impl Stationarity {
    /// `Stationary` iff `p_value < significance`; equality is not significant.
    pub fn from_p_value(p_value: f64, significance: f64) -> Self {
        if p_value < significance {
            Stationarity::Stationary
        } else {
            Stationarity::NonStationary
        }
    }

    pub fn is_stationary(&self) -> bool {
        matches!(self, Stationarity::Stationary)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stationarity::Stationary => "stationary",
            Stationarity::NonStationary => "non-stationary",
        }
    }
}

/// Result of a stationarity test.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences used
    pub lags: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    pub fn classify(&self, significance: f64) -> Stationarity {
        Stationarity::from_p_value(self.p_value, significance)
    }

    /// Verdict at the 5% level.
    pub fn is_stationary(&self) -> bool {
        self.classify(DEFAULT_SIGNIFICANCE).is_stationary()
    }
}

/// Augmented Dickey-Fuller test for a unit root.
///
/// The null hypothesis is a unit root (non-stationary); a small p-value
/// rejects it.
///
/// # Errors
/// * [`ForecastError::InsufficientData`] below [`MIN_ADF_OBSERVATIONS`].
/// * [`ForecastError::MissingValues`] if the series holds NaN or infinities.
/// * [`ForecastError::ComputationError`] for a degenerate regression, such as
///   a constant series.
pub fn adf_test(series: &[f64], config: &AdfConfig) -> Result<StationarityResult> {
    let n = series.len();
    if n < MIN_ADF_OBSERVATIONS {
        return Err(ForecastError::InsufficientData {
            needed: MIN_ADF_OBSERVATIONS,
            got: n,
        });
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lags = config.max_lags.unwrap_or(default_lags).min(n / 2 - 2);
    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let lags = match config.autolag {
        AutoLag::Fixed => max_lags,
        AutoLag::Aic => select_lag_aic(series, &diff, max_lags)?,
    };

    let fit = adf_regression(series, &diff, lags, lags).map_err(degenerate)?;
    let statistic = fit.t_value(0);
    if !statistic.is_finite() {
        return Err(ForecastError::ComputationError(
            "ADF statistic is not finite; the series may be constant or perfectly trending"
                .to_string(),
        ));
    }

    let result = StationarityResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        lags,
        nobs: fit.nobs,
        critical_values: mackinnon_critical_values(fit.nobs),
    };
    debug!(
        "ADF: statistic {:.4}, p-value {:.4}, {} lags, {} observations",
        result.statistic, result.p_value, result.lags, result.nobs
    );
    Ok(result)
}

fn degenerate(err: ForecastError) -> ForecastError {
    match err {
        ForecastError::ComputationError(_) => ForecastError::ComputationError(
            "ADF regression is singular; the series may be constant".to_string(),
        ),
        other => other,
    }
}

/// Lag count in `0..=max_lags` with the lowest AIC; ties go to fewer lags.
fn select_lag_aic(series: &[f64], diff: &[f64], max_lags: usize) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    for lags in 0..=max_lags {
        let aic = match adf_regression(series, diff, lags, max_lags) {
            Ok(fit) => fit.aic(),
            Err(ForecastError::ComputationError(_)) => continue,
            Err(e) => return Err(e),
        };
        if aic.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| aic < b) {
            best = Some((lags, aic));
        }
    }
    best.map(|(lags, _)| lags).ok_or_else(|| {
        degenerate(ForecastError::ComputationError(String::new()))
    })
}

/// Fit the ADF regression with `lags` lagged differences on the sample that
/// starts after `start` differences (`start >= lags`).
///
/// Column 0 is the lagged level, followed by the lagged differences and the
/// constant.
fn adf_regression(series: &[f64], diff: &[f64], lags: usize, start: usize) -> Result<OLSResult> {
    let nobs = diff.len().saturating_sub(start);
    let y = &diff[start..];

    let mut columns = Vec::with_capacity(lags + 2);
    columns.push(series[start..start + nobs].to_vec());
    for j in 1..=lags {
        columns.push(diff[start - j..start - j + nobs].to_vec());
    }
    columns.push(vec![1.0; nobs]);

    ols_fit(y, &columns)
}

/// MacKinnon (1994) approximate p-value, constant-only regression.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefs.iter().rev().fold(0.0, |acc, c| acc * statistic + c);
    normal_cdf(z)
}

/// MacKinnon (2010) finite-sample critical values, constant-only regression.
pub fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    const TAU_C: [[f64; 4]; 3] = [
        [-3.43035, -6.5393, -16.786, -79.433],
        [-2.86154, -2.8903, -4.234, -40.04],
        [-2.56677, -1.5384, -2.809, 0.0],
    ];
    let inv = 1.0 / nobs.max(1) as f64;
    let crit = |c: &[f64; 4]| c[0] + c[1] * inv + c[2] * inv.powi(2) + c[3] * inv.powi(3);
    CriticalValues {
        cv_1pct: crit(&TAU_C[0]),
        cv_5pct: crit(&TAU_C[1]),
        cv_10pct: crit(&TAU_C[2]),
    }
}
