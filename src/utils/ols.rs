//! Ordinary Least Squares (OLS) regression with coefficient standard errors.
//!
//! Used by the Dickey-Fuller regression, which needs t-statistics and
//! information criteria rather than just point estimates.

use crate::error::{ForecastError, Result};

/// Fitted OLS regression `y = X @ beta + e`.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// One coefficient per design-matrix column, in column order.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OLSResult {
    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        match (self.coefficients.get(i), self.std_errors.get(i)) {
            (Some(&b), Some(&se)) if se > 0.0 => b / se,
            _ => f64::NAN,
        }
    }

    /// Gaussian log-likelihood at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every column as a parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit OLS where `columns[j][i]` is regressor `j` at observation `i`.
///
/// Include a column of ones for an intercept. Solves the normal equations by
/// Cholesky decomposition.
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OLSResult> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "OLS needs at least one regressor".into(),
        ));
    }
    for col in columns {
        if col.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: col.len(),
            });
        }
    }
    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    let l = cholesky(&xtx).ok_or_else(|| {
        ForecastError::ComputationError("OLS regression failed: design matrix is singular".into())
    })?;
    let coefficients = cholesky_solve(&l, &xty);

    let ssr: f64 = (0..n)
        .map(|obs| {
            let fitted: f64 = (0..k).map(|j| coefficients[j] * columns[j][obs]).sum();
            (y[obs] - fitted).powi(2)
        })
        .sum();
    let sigma_sq = ssr / (n - k) as f64;

    // Diagonal of (X'X)^-1, one unit vector at a time.
    let std_errors = (0..k)
        .map(|j| {
            let mut e = vec![0.0; k];
            e[j] = 1.0;
            let col = cholesky_solve(&l, &e);
            (sigma_sq * col[j]).max(0.0).sqrt()
        })
        .collect();

    Ok(OLSResult {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Lower-triangular `L` with `A = L @ L'`, or `None` if `A` is not positive definite.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= scale * 1e-12 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    x
}
