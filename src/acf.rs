use crate::{Error, Result};

/// Sample autocorrelation function for lags `0..=max_lag`.
///
/// Every autocovariance is normalised by the full-sample variance, so the
/// value at lag 0 is exactly 1. A constant series has zero autocorrelation
/// at every non-zero lag.
///
/// # Example
///
/// ```
/// use arima_garch::acf;
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let rho = acf::acf(&x, 2).unwrap();
/// assert_eq!(rho[0], 1.0);
/// ```
pub fn acf(x: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let n = x.len();
    if n == 0 {
        return Err(Error::InvalidArgument(
            "cannot compute ACF of an empty series".to_string(),
        ));
    }
    if max_lag >= n {
        return Err(Error::InvalidArgument(format!(
            "max_lag {max_lag} must be less than the sample size {n}"
        )));
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let variance: f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum();

    let mut rho = Vec::with_capacity(max_lag + 1);
    rho.push(1.0);

    if variance == 0.0 {
        // constant series
        rho.resize(max_lag + 1, 0.0);
        return Ok(rho);
    }

    for lag in 1..=max_lag {
        let mut autocov = 0.0;
        for i in 0..n - lag {
            autocov += (x[i] - mean) * (x[i + lag] - mean);
        }
        rho.push(autocov / variance);
    }
    Ok(rho)
}

/// Sample autocorrelation at a single lag.
pub fn acf_at_lag(x: &[f64], lag: usize) -> Result<f64> {
    Ok(acf(x, lag)?[lag])
}

/// Partial autocorrelation function for lags `1..=max_lag`, computed with
/// the Durbin-Levinson recursion over the sample ACF.
pub fn pacf(x: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    if max_lag == 0 {
        return Err(Error::InvalidArgument(
            "PACF requires max_lag >= 1".to_string(),
        ));
    }
    let rho = acf(x, max_lag)?;
    pacf_from_acf(&rho)
}

/// Durbin-Levinson recursion on a precomputed ACF (lag 0 first). Returns
/// partial autocorrelations for lags `1..rho.len()`.
pub fn pacf_from_acf(rho: &[f64]) -> Result<Vec<f64>> {
    if rho.len() < 2 {
        return Err(Error::InvalidArgument(
            "need autocorrelations at lag 1 or beyond".to_string(),
        ));
    }
    let max_lag = rho.len() - 1;

    let mut result = Vec::with_capacity(max_lag);
    let mut phi = vec![0.0; max_lag + 1];
    let mut phi_new = vec![0.0; max_lag + 1];

    phi[1] = rho[1];
    result.push(phi[1]);

    for k in 2..=max_lag {
        let mut numerator = rho[k];
        for j in 1..k {
            numerator -= phi[j] * rho[k - j];
        }
        let mut denominator = 1.0;
        for j in 1..k {
            denominator -= phi[j] * rho[j];
        }

        phi_new[k] = if denominator.abs() < 1e-10 {
            0.0
        } else {
            numerator / denominator
        };
        for j in 1..k {
            phi_new[j] = phi[j] - phi_new[k] * phi[k - j];
        }
        phi[1..=k].copy_from_slice(&phi_new[1..=k]);
        result.push(phi[k]);
    }
    Ok(result)
}
