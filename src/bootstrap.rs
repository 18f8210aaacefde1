//! Bootstrap alternatives to the asymptotic residual tests, for use when
//! innovations are heavy-tailed and chi-square / Dickey-Fuller asymptotics
//! are unreliable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::diagnostics::{
    adf_statistic, default_max_lags, ljung_box_statistic, solve_least_squares, AdfRegression,
    AdfResult, LjungBoxResult,
};
use crate::util;
use crate::{Error, Result};

fn resample_with_replacement(data: &[f64], rng: &mut StdRng) -> Vec<f64> {
    (0..data.len())
        .map(|_| data[rng.gen_range(0..data.len())])
        .collect()
}

/// Residual-bootstrap Ljung-Box test.
///
/// Centres the residuals, resamples them with replacement `replications`
/// times, and returns p = #{Q* >= Q_obs} / B. The reported dof follows the
/// asymptotic convention (equal to `lags`; callers adjust for estimated
/// parameters).
pub fn ljung_box_test_bootstrap(
    residuals: &[f64],
    lags: usize,
    replications: usize,
    seed: u64,
) -> Result<LjungBoxResult> {
    if replications == 0 {
        return Err(Error::InvalidArgument(
            "number of bootstrap replications must be positive".to_string(),
        ));
    }

    let q_observed = ljung_box_statistic(residuals, lags)?;

    let (centered, _mean) = util::center(residuals);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut count_ge = 0usize;
    for _ in 0..replications {
        let resampled = resample_with_replacement(&centered, &mut rng);
        let q_star = ljung_box_statistic(&resampled, lags)?;
        if q_star >= q_observed {
            count_ge += 1;
        }
    }

    Ok(LjungBoxResult {
        statistic: q_observed,
        p_value: count_ge as f64 / replications as f64,
        lags,
        dof: lags,
    })
}

// Fit an AR(p) model by least squares (no intercept) and return the
// coefficients together with the fit residuals. Falls back to no AR
// structure when the system is singular or the series is too short.
fn fit_ar_model(data: &[f64], p: usize) -> (Vec<f64>, Vec<f64>) {
    let n = data.len();
    if p == 0 || n <= p {
        return (Vec::new(), data.to_vec());
    }

    let n_obs = n - p;
    let mut x = Vec::with_capacity(n_obs);
    let mut y = Vec::with_capacity(n_obs);
    for t in 0..n_obs {
        y.push(data[p + t]);
        let row: Vec<f64> = (0..p).map(|j| data[p + t - j - 1]).collect();
        x.push(row);
    }

    let Some(phi) = solve_least_squares(&x, &y) else {
        return (Vec::new(), data.to_vec());
    };

    let residuals: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(row, &yt)| {
            let fitted: f64 = row.iter().zip(phi.iter()).map(|(xi, pi)| xi * pi).sum();
            yt - fitted
        })
        .collect();
    (phi, residuals)
}

// Generate one replicate under the unit-root null: draw differences from
// the AR recursion with resampled residuals, then cumulate from zero.
fn unit_root_replicate(
    phi_diff: &[f64],
    residuals: &[f64],
    n: usize,
    rng: &mut StdRng,
) -> Vec<f64> {
    let p = phi_diff.len();
    let resampled: Vec<f64> = (0..n)
        .map(|_| residuals[rng.gen_range(0..residuals.len())])
        .collect();

    let mut dy_star = vec![0.0; n];
    if p == 0 {
        dy_star.copy_from_slice(&resampled);
    } else {
        for t in p..n {
            let mut v = resampled[t];
            for j in 0..p {
                v += phi_diff[j] * dy_star[t - j - 1];
            }
            dy_star[t] = v;
        }
    }

    let mut y_star = vec![0.0; n];
    for t in 1..n {
        y_star[t] = y_star[t - 1] + dy_star[t];
    }
    y_star
}

/// Sieve-bootstrap ADF test.
///
/// Fits an AR(p) model to the first differences, resamples its centred
/// residuals, generates replicates with an imposed unit root, and returns
/// p = #{tau* <= tau_obs} / B. The critical values are the empirical 1/5/10%
/// quantiles of the bootstrap distribution.
pub fn adf_test_bootstrap(
    data: &[f64],
    lags: Option<usize>,
    form: AdfRegression,
    replications: usize,
    seed: u64,
) -> Result<AdfResult> {
    let n = data.len();
    if n <= 10 {
        return Err(Error::InvalidArgument(
            "insufficient data for the bootstrap ADF test (need more than 10)".to_string(),
        ));
    }
    if replications == 0 {
        return Err(Error::InvalidArgument(
            "number of bootstrap replications must be positive".to_string(),
        ));
    }

    let adf_lags = lags.unwrap_or(0);
    let tau_observed = adf_statistic(data, adf_lags, form)?;

    let ar_order = match lags {
        Some(l) if l > 0 => l,
        _ => default_max_lags(n).clamp(1, n / 4),
    };

    let differences = util::diff(data, 1);
    let (phi_diff, residuals) = fit_ar_model(&differences, ar_order);
    let (centered, _mean) = util::center(&residuals);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut statistics = Vec::with_capacity(replications);
    for _ in 0..replications {
        let replicate = unit_root_replicate(&phi_diff, &centered, n, &mut rng);
        match adf_statistic(&replicate, adf_lags, form) {
            Ok(tau) => statistics.push(tau),
            Err(_) => statistics.push(0.0),
        }
    }
    statistics.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count_le = statistics.iter().filter(|&&t| t <= tau_observed).count();
    let p_value = count_le as f64 / replications as f64;

    let quantile = |level: f64| {
        let idx = ((level * replications as f64) as usize).min(replications - 1);
        statistics[idx]
    };

    Ok(AdfResult {
        statistic: tau_observed,
        p_value,
        lags: adf_lags,
        regression: form,
        critical_value_1pct: quantile(0.01),
        critical_value_5pct: quantile(0.05),
        critical_value_10pct: quantile(0.10),
    })
}
