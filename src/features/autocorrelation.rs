//! Autocorrelation diagnostics for choosing AR and MA orders.
//!
//! The ACF confidence band uses Bartlett's formula, so it widens with every
//! lag that carries correlation; the PACF band is the white-noise band
//! `z / sqrt(n)`.

use crate::error::{ForecastError, Result};
use crate::utils::stats::{mean, quantile_normal};

/// Returns the sample autocorrelation at a specific lag.
///
/// Uses the biased (divide by `n`) autocovariance. A constant series has
/// zero correlation at every positive lag.
///
/// # Arguments
/// * `series` - Input time series
/// * `lag` - Lag value
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.len() <= lag {
        return f64::NAN;
    }

    let m = mean(series);
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &x) in series.iter().enumerate() {
        denominator += (x - m).powi(2);
        if i >= lag {
            numerator += (x - m) * (series[i - lag] - m);
        }
    }

    if denominator < 1e-10 {
        return if lag == 0 { 1.0 } else { 0.0 };
    }

    numerator / denominator
}

/// Autocorrelations for lags `0..=max_lag`.
pub fn acf(series: &[f64], max_lag: usize) -> Vec<f64> {
    (0..=max_lag).map(|k| autocorrelation(series, k)).collect()
}

/// Partial autocorrelations for lags `0..=max_lag` by Durbin-Levinson
/// recursion on the sample ACF.
///
/// Lags past a degenerate step are NaN.
pub fn pacf(series: &[f64], max_lag: usize) -> Vec<f64> {
    let rho = acf(series, max_lag);
    let mut out = vec![f64::NAN; max_lag + 1];
    out[0] = 1.0;
    if max_lag == 0 || rho.iter().any(|r| r.is_nan()) {
        return out;
    }

    let mut phi = vec![rho[1]];
    out[1] = rho[1];

    for k in 2..=max_lag {
        let num = rho[k] - (1..k).map(|j| phi[j - 1] * rho[k - j]).sum::<f64>();
        let denom = 1.0 - (1..k).map(|j| phi[j - 1] * rho[j]).sum::<f64>();
        if denom.abs() < 1e-10 {
            break;
        }

        let phi_kk = num / denom;
        let mut next: Vec<f64> = (1..k)
            .map(|j| phi[j - 1] - phi_kk * phi[k - j - 1])
            .collect();
        next.push(phi_kk);
        phi = next;
        out[k] = phi_kk;
    }

    out
}

/// Returns the partial autocorrelation at a specific lag.
pub fn partial_autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.len() <= lag {
        return f64::NAN;
    }
    pacf(series, lag)[lag]
}

/// ACF and PACF with 95% confidence bands.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationDiagnostics {
    /// Number of observations the correlations were computed from.
    pub nobs: usize,
    /// `acf[k]` for lags `0..=lags`; `acf[0] == 1`.
    pub acf: Vec<f64>,
    /// `pacf[k]` for lags `0..=lags`; `pacf[0] == 1`.
    pub pacf: Vec<f64>,
    /// Half-width of the ACF band at each lag (zero at lag 0).
    pub acf_bounds: Vec<f64>,
    /// Half-width of the PACF band, the same at every lag.
    pub pacf_bound: f64,
}

impl CorrelationDiagnostics {
    /// Largest lag reported.
    pub fn lags(&self) -> usize {
        self.acf.len().saturating_sub(1)
    }

    /// Positive lags whose ACF falls outside the band.
    pub fn significant_acf_lags(&self) -> Vec<usize> {
        (1..self.acf.len())
            .filter(|&k| self.acf[k].abs() > self.acf_bounds[k])
            .collect()
    }

    /// Positive lags whose PACF falls outside the band.
    pub fn significant_pacf_lags(&self) -> Vec<usize> {
        (1..self.pacf.len())
            .filter(|&k| self.pacf[k].abs() > self.pacf_bound)
            .collect()
    }
}

/// Compute ACF/PACF diagnostics up to `lags`.
///
/// Partial correlations are only estimable up to half the sample size, so a
/// series shorter than `2 * lags` is rejected.
pub fn correlation_diagnostics(series: &[f64], lags: usize) -> Result<CorrelationDiagnostics> {
    if lags == 0 {
        return Err(ForecastError::InvalidParameter(
            "at least one lag is required".into(),
        ));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }
    let n = series.len();
    if n < 2 * lags {
        return Err(ForecastError::InsufficientData {
            needed: 2 * lags,
            got: n,
        });
    }

    let m = mean(series);
    if series.iter().all(|x| (x - m).abs() < 1e-12) {
        return Err(ForecastError::ComputationError(
            "autocorrelation is undefined for a constant series".into(),
        ));
    }

    let acf_values = acf(series, lags);
    let pacf_values = pacf(series, lags);
    let z = quantile_normal(0.975);
    let nf = n as f64;

    // Bartlett: var(r_k) = (1 + 2 * sum_{j<k} r_j^2) / n
    let mut acf_bounds = Vec::with_capacity(lags + 1);
    acf_bounds.push(0.0);
    let mut cumulative = 0.0;
    for k in 1..=lags {
        if k > 1 {
            cumulative += acf_values[k - 1].powi(2);
        }
        acf_bounds.push(z * ((1.0 + 2.0 * cumulative) / nf).sqrt());
    }

    Ok(CorrelationDiagnostics {
        nobs: n,
        acf: acf_values,
        pacf: pacf_values,
        acf_bounds,
        pacf_bound: z / nf.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ar1(n: usize, phi: f64) -> Vec<f64> {
        // Deterministic pseudo-noise drives the recursion.
        let mut state: u64 = 11;
        let mut values = Vec::with_capacity(n);
        let mut prev = 0.0;
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let e = ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0;
            prev = phi * prev + e;
            values.push(prev);
        }
        values
    }

    // ==================== acf ====================

    #[test]
    fn acf_lag_zero_is_one() {
        let series = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        assert_relative_eq!(autocorrelation(&series, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn acf_known_values() {
        // mean 3, deviations -2..2, sum of squares 10
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let r = acf(&series, 2);
        assert_relative_eq!(r[1], 4.0 / 10.0, epsilon = 1e-12);
        assert_relative_eq!(r[2], -1.0 / 10.0, epsilon = 1e-12);
    }

    #[test]
    fn acf_lag_beyond_length_is_nan() {
        assert!(autocorrelation(&[1.0, 2.0], 2).is_nan());
    }

    // ==================== pacf ====================

    #[test]
    fn pacf_lag_one_equals_acf_lag_one() {
        let series = ar1(200, 0.6);
        let r = acf(&series, 1);
        let p = pacf(&series, 1);
        assert_relative_eq!(p[1], r[1], epsilon = 1e-12);
    }

    #[test]
    fn pacf_lag_two_matches_closed_form() {
        let series = ar1(200, 0.6);
        let r = acf(&series, 2);
        let expected = (r[2] - r[1] * r[1]) / (1.0 - r[1] * r[1]);
        assert_relative_eq!(partial_autocorrelation(&series, 2), expected, epsilon = 1e-12);
    }

    #[test]
    fn ar1_pacf_cuts_off_after_lag_one() {
        let series = ar1(400, 0.7);
        let p = pacf(&series, 5);
        assert!(p[1] > 0.5);
        for &v in &p[2..] {
            assert!(v.abs() < 0.15, "pacf {v} should be near zero");
        }
    }

    // ==================== diagnostics ====================

    #[test]
    fn diagnostics_shapes_and_bands() {
        let series = ar1(120, 0.5);
        let diag = correlation_diagnostics(&series, 20).unwrap();

        assert_eq!(diag.lags(), 20);
        assert_eq!(diag.acf.len(), 21);
        assert_eq!(diag.pacf.len(), 21);
        assert_eq!(diag.acf_bounds[0], 0.0);
        assert_relative_eq!(diag.acf_bounds[1], 1.959964 / 120f64.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(diag.pacf_bound, 1.959964 / 120f64.sqrt(), epsilon = 1e-5);
        assert!(diag.acf_bounds.windows(2).all(|w| w[1] >= w[0]));
        assert!(diag.significant_acf_lags().contains(&1));
        assert!(diag.significant_pacf_lags().contains(&1));
    }

    #[test]
    fn diagnostics_need_twice_the_lags() {
        let series = ar1(30, 0.5);
        assert!(matches!(
            correlation_diagnostics(&series, 20),
            Err(ForecastError::InsufficientData { needed: 40, got: 30 })
        ));
    }

    #[test]
    fn diagnostics_reject_constant_series() {
        assert!(matches!(
            correlation_diagnostics(&[3.0; 50], 10),
            Err(ForecastError::ComputationError(_))
        ));
    }

    #[test]
    fn diagnostics_reject_zero_lags() {
        assert!(matches!(
            correlation_diagnostics(&[1.0, 2.0, 3.0], 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
