//! Residual diagnostics: Ljung-Box, Jarque-Bera and augmented Dickey-Fuller
//! tests, plus the report that bundles them for a fitted model.

use serde::{Deserialize, Serialize};

use crate::params::ArimaGarchParameters;
use crate::sim::InnovationDistribution;
use crate::spec::ArimaGarchSpec;
use crate::{acf, arima, garch, stats};
use crate::{Error, Result};

const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Residual triple produced by re-filtering the data with fitted
/// parameters: innovations, conditional variances and standardised
/// residuals z_t = eps_t / sqrt(h_t).
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualSeries {
    pub residuals: Vec<f64>,
    pub variances: Vec<f64>,
    pub standardized: Vec<f64>,
}

/// Re-run both filters over the data. Any non-finite value or non-positive
/// variance is a fatal numerical error.
///
/// Uses the same difference-aware filters as the likelihood, so the
/// residuals here replay exactly the series the NLL was computed from.
pub fn residual_series(
    data: &[f64],
    spec: &ArimaGarchSpec,
    params: &ArimaGarchParameters,
) -> Result<ResidualSeries> {
    let residuals = arima::compute_residuals(data, &spec.arima, &params.arima)?;
    let variances = garch::compute_conditional_variances(&residuals, &spec.garch, &params.garch)?;

    let mut standardized = Vec::with_capacity(residuals.len());
    for (eps, h) in residuals.iter().zip(variances.iter()) {
        if *h <= 0.0 {
            return Err(Error::Numerical(
                "non-positive conditional variance in residual series".to_string(),
            ));
        }
        let z = eps / h.sqrt();
        if !eps.is_finite() || !h.is_finite() || !z.is_finite() {
            return Err(Error::Numerical(
                "non-finite value in residual series".to_string(),
            ));
        }
        standardized.push(z);
    }

    Ok(ResidualSeries {
        residuals,
        variances,
        standardized,
    })
}

// ---------------------------------------------------------------------------
// Ljung-Box
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LjungBoxResult {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
    pub dof: usize,
}

/// Portmanteau statistic Q(h) = n(n+2) sum_{k=1..h} rho_k^2 / (n - k).
pub fn ljung_box_statistic(x: &[f64], lags: usize) -> Result<f64> {
    let n = x.len();
    if n == 0 {
        return Err(Error::InvalidArgument(
            "cannot compute the Ljung-Box statistic of an empty series".to_string(),
        ));
    }
    if lags == 0 {
        return Err(Error::InvalidArgument(
            "number of lags must be positive".to_string(),
        ));
    }
    if lags >= n {
        return Err(Error::InvalidArgument(format!(
            "number of lags {lags} must be less than the sample size {n}"
        )));
    }

    let rho = acf::acf(x, lags)?;
    let mut q = 0.0;
    for k in 1..=lags {
        q += rho[k] * rho[k] / (n - k) as f64;
    }
    Ok(q * (n * (n + 2)) as f64)
}

/// Ljung-Box test with chi-square(dof) null. `dof` defaults to `lags`; pass
/// `lags - k` when the series is a residual of a model with k estimated
/// parameters, in which case `lags` must exceed k.
pub fn ljung_box_test(x: &[f64], lags: usize, dof: Option<usize>) -> Result<LjungBoxResult> {
    let statistic = ljung_box_statistic(x, lags)?;
    let dof = dof.unwrap_or(lags);
    if dof == 0 {
        return Err(Error::InvalidArgument(
            "degrees of freedom must be positive".to_string(),
        ));
    }
    let p_value = stats::chi_square_ccdf(statistic, dof as f64)?;
    Ok(LjungBoxResult {
        statistic,
        p_value,
        lags,
        dof,
    })
}

// ---------------------------------------------------------------------------
// Jarque-Bera
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JarqueBeraResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// JB = n/6 * (S^2 + K^2/4) with bias-corrected skewness S and excess
/// kurtosis K; null distribution chi-square(2).
pub fn jarque_bera_test(x: &[f64]) -> Result<JarqueBeraResult> {
    if x.len() < 4 {
        return Err(Error::InvalidArgument(
            "Jarque-Bera requires at least 4 observations".to_string(),
        ));
    }
    let s = stats::skewness(x)?;
    let k = stats::kurtosis(x)?;
    let statistic = (x.len() as f64 / 6.0) * (s * s + k * k / 4.0);
    let p_value = stats::chi_square_ccdf(statistic, 2.0)?;
    Ok(JarqueBeraResult { statistic, p_value })
}

// ---------------------------------------------------------------------------
// Augmented Dickey-Fuller
// ---------------------------------------------------------------------------

/// Deterministic terms included in the ADF regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdfRegression {
    /// No constant, no trend.
    None,
    /// Constant only.
    Constant,
    /// Constant and linear trend.
    ConstantAndTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
    pub regression: AdfRegression,
    pub critical_value_1pct: f64,
    pub critical_value_5pct: f64,
    pub critical_value_10pct: f64,
}

// MacKinnon-style critical values for n = 100, by regression form then
// significance level (1%, 5%, 10%)
const ADF_CRITICAL_VALUES: [[f64; 3]; 3] = [
    [-2.58, -1.95, -1.62],
    [-3.51, -2.89, -2.58],
    [-4.04, -3.45, -3.15],
];

fn adjust_critical_value(base: f64, n: usize, form: AdfRegression) -> f64 {
    if n <= 25 {
        let shift = match form {
            AdfRegression::None => 0.0,
            AdfRegression::Constant => -0.1,
            AdfRegression::ConstantAndTrend => -0.15,
        };
        base + shift
    } else if n >= 500 {
        base * 1.02
    } else {
        base
    }
}

fn critical_values(n: usize, form: AdfRegression) -> [f64; 3] {
    let row = match form {
        AdfRegression::None => ADF_CRITICAL_VALUES[0],
        AdfRegression::Constant => ADF_CRITICAL_VALUES[1],
        AdfRegression::ConstantAndTrend => ADF_CRITICAL_VALUES[2],
    };
    [
        adjust_critical_value(row[0], n, form),
        adjust_critical_value(row[1], n, form),
        adjust_critical_value(row[2], n, form),
    ]
}

// Linear interpolation between tabulated levels; exponential extrapolation
// beyond the 1% point; capped near 1 for positive statistics.
fn interpolate_p_value(statistic: f64, cv: &[f64; 3]) -> f64 {
    let [cv1, cv5, cv10] = *cv;
    if statistic < cv1 {
        let excess = (cv1 - statistic) / cv1.abs();
        (0.01 * (-excess).exp()).max(0.001)
    } else if statistic < cv5 {
        0.01 + (statistic - cv1) / (cv5 - cv1) * 0.04
    } else if statistic < cv10 {
        0.05 + (statistic - cv5) / (cv10 - cv5) * 0.05
    } else if statistic < 0.0 {
        0.10 + (statistic - cv10) / (0.0 - cv10) * 0.10
    } else {
        (0.20 + statistic * 0.1).min(0.99)
    }
}

/// Solve the normal equations (X'X) beta = X'y by Gaussian elimination with
/// partial pivoting. `x` is row-major, one row per observation.
pub(crate) fn solve_least_squares(x: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let n = y.len();
    if n == 0 || x.len() != n {
        return None;
    }
    let k = x[0].len();
    if k == 0 || n < k {
        return None;
    }

    let xtx = cross_products(x, k);
    let mut xty = vec![0.0; k];
    for (row, &yt) in x.iter().zip(y.iter()) {
        for (i, &xi) in row.iter().enumerate() {
            xty[i] += xi * yt;
        }
    }
    solve_system(xtx, xty)
}

fn cross_products(x: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut xtx = vec![vec![0.0; k]; k];
    for row in x {
        for i in 0..k {
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }
    xtx
}

// Gaussian elimination with partial pivoting on [a | b].
fn solve_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let k = b.len();
    for col in 0..k {
        let mut pivot = col;
        let mut max_val = a[col][col].abs();
        for row in col + 1..k {
            if a[row][col].abs() > max_val {
                max_val = a[row][col].abs();
                pivot = row;
            }
        }
        if max_val < SINGULARITY_TOLERANCE {
            return None;
        }
        if pivot != col {
            a.swap(col, pivot);
            b.swap(col, pivot);
        }
        for row in col + 1..k {
            let factor = a[row][col] / a[col][col];
            for j in col..k {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut beta = vec![0.0; k];
    for i in (0..k).rev() {
        let mut value = b[i];
        for j in i + 1..k {
            value -= a[i][j] * beta[j];
        }
        beta[i] = value / a[i][i];
    }
    Some(beta)
}

// Invert a symmetric positive matrix by Gauss-Jordan elimination with
// partial pivoting; used for the OLS covariance diagonal.
fn invert_matrix(m: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let k = m.len();
    let mut aug: Vec<Vec<f64>> = m
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut r = row.clone();
            r.extend((0..k).map(|j| if i == j { 1.0 } else { 0.0 }));
            r
        })
        .collect();

    for col in 0..k {
        let mut pivot = col;
        let mut max_val = aug[col][col].abs();
        for row in col + 1..k {
            if aug[row][col].abs() > max_val {
                max_val = aug[row][col].abs();
                pivot = row;
            }
        }
        if max_val < SINGULARITY_TOLERANCE {
            return None;
        }
        aug.swap(col, pivot);

        let pivot_value = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot_value;
        }
        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            let pivot_row = aug[col].clone();
            for (v, pv) in aug[row].iter_mut().zip(pivot_row.iter()) {
                *v -= factor * pv;
            }
        }
    }

    Some(aug.into_iter().map(|row| row[k..].to_vec()).collect())
}

// OLS t-statistic for the coefficient at `coef_index`.
fn ols_t_statistic(y: &[f64], x: &[Vec<f64>], coef_index: usize) -> Result<f64> {
    let n = y.len();
    let k = x.first().map(|r| r.len()).unwrap_or(0);
    if n == 0 || k == 0 || n <= k {
        return Err(Error::InvalidArgument(
            "invalid dimensions for OLS regression".to_string(),
        ));
    }

    let xtx = cross_products(x, k);
    let beta = solve_least_squares(x, y).ok_or_else(|| {
        Error::Numerical("singular design matrix in OLS regression".to_string())
    })?;

    let mut rss = 0.0;
    for (row, &yt) in x.iter().zip(y.iter()) {
        let fitted: f64 = row.iter().zip(beta.iter()).map(|(xi, bi)| xi * bi).sum();
        let resid = yt - fitted;
        rss += resid * resid;
    }
    let sigma2 = rss / (n - k) as f64;

    let inv = invert_matrix(&xtx)
        .ok_or_else(|| Error::Numerical("singular moment matrix in OLS regression".to_string()))?;
    let se = (sigma2 * inv[coef_index][coef_index]).sqrt();
    if se < SINGULARITY_TOLERANCE {
        return Err(Error::Numerical(
            "zero standard error in OLS regression".to_string(),
        ));
    }
    Ok(beta[coef_index] / se)
}

// Build the ADF regression for `lags` lagged differences and return (y, X,
// index of the level coefficient).
fn build_adf_regression(
    data: &[f64],
    lags: usize,
    form: AdfRegression,
) -> Result<(Vec<f64>, Vec<Vec<f64>>, usize)> {
    let n = data.len();
    let k_det = match form {
        AdfRegression::None => 0,
        AdfRegression::Constant => 1,
        AdfRegression::ConstantAndTrend => 2,
    };
    let k_total = k_det + 1 + lags;
    if n < lags + 2 {
        return Err(Error::InvalidArgument(
            "insufficient data for ADF regression".to_string(),
        ));
    }
    let n_obs = n - lags - 1;
    if n_obs <= k_total {
        return Err(Error::InvalidArgument(
            "insufficient observations for the requested ADF lags".to_string(),
        ));
    }

    let mut y = Vec::with_capacity(n_obs);
    let mut x = Vec::with_capacity(n_obs);
    for t in lags + 1..n {
        y.push(data[t] - data[t - 1]);

        let mut row = Vec::with_capacity(k_total);
        if k_det >= 1 {
            row.push(1.0);
        }
        if k_det == 2 {
            row.push(t as f64);
        }
        row.push(data[t - 1]);
        for lag in 1..=lags {
            row.push(data[t - lag] - data[t - lag - 1]);
        }
        x.push(row);
    }
    Ok((y, x, k_det))
}

/// ADF t-statistic for a fixed lag count (no p-value lookup). Shared by the
/// asymptotic test and the sieve bootstrap.
pub(crate) fn adf_statistic(data: &[f64], lags: usize, form: AdfRegression) -> Result<f64> {
    let (y, x, coef_index) = build_adf_regression(data, lags, form)?;
    ols_t_statistic(&y, &x, coef_index)
}

/// Schwert's rule of thumb for the deepest lag worth trying.
pub(crate) fn default_max_lags(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

// Modified-AIC lag selection: ln(RSS/n_obs) + 2k/n_obs over 0..=max_lags.
fn select_adf_lags(data: &[f64], max_lags: usize, form: AdfRegression) -> usize {
    let n = data.len();
    let max_lags = max_lags.min(n / 4);

    let mut best_ic = f64::INFINITY;
    let mut best_lags = 0;
    for lags in 0..=max_lags {
        let Ok((y, x, _)) = build_adf_regression(data, lags, form) else {
            continue;
        };
        let n_obs = y.len();
        let k_total = x[0].len();
        if n_obs < k_total + 10 {
            continue;
        }
        let Some(beta) = solve_least_squares(&x, &y) else {
            continue;
        };
        let mut rss = 0.0;
        for (row, &yt) in x.iter().zip(y.iter()) {
            let fitted: f64 = row.iter().zip(beta.iter()).map(|(xi, bi)| xi * bi).sum();
            rss += (yt - fitted) * (yt - fitted);
        }
        if rss <= 0.0 {
            continue;
        }
        let ic = (rss / n_obs as f64).ln() + 2.0 * k_total as f64 / n_obs as f64;
        if ic < best_ic {
            best_ic = ic;
            best_lags = lags;
        }
    }
    best_lags
}

/// Augmented Dickey-Fuller unit-root test.
///
/// Regression: dy_t = alpha + beta*t + phi*y_{t-1} + sum gamma_j dy_{t-j}.
/// When `lags` is `None` the lag length is chosen by a modified AIC rule,
/// searching up to `max_lags` (default `12 * (n/100)^(1/4)`).
pub fn adf_test(
    data: &[f64],
    lags: Option<usize>,
    form: AdfRegression,
    max_lags: Option<usize>,
) -> Result<AdfResult> {
    let n = data.len();
    if n < 10 {
        return Err(Error::InvalidArgument(
            "ADF test requires at least 10 observations".to_string(),
        ));
    }

    let lags = match lags {
        Some(l) => l,
        None => select_adf_lags(data, max_lags.unwrap_or_else(|| default_max_lags(n)), form),
    };
    if lags >= n / 2 {
        return Err(Error::InvalidArgument(
            "too many ADF lags for the sample size".to_string(),
        ));
    }

    let statistic = adf_statistic(data, lags, form)?;
    let cv = critical_values(n, form);
    let p_value = interpolate_p_value(statistic, &cv);

    Ok(AdfResult {
        statistic,
        p_value,
        lags,
        regression: form,
        critical_value_1pct: cv[0],
        critical_value_5pct: cv[1],
        critical_value_10pct: cv[2],
    })
}

/// ADF with the regression form chosen by sequential top-down testing:
/// constant+trend if it rejects at 5%, else constant if it rejects at 10%,
/// else no deterministic terms.
pub fn adf_test_auto(
    data: &[f64],
    lags: Option<usize>,
    max_lags: Option<usize>,
) -> Result<AdfResult> {
    let with_trend = adf_test(data, lags, AdfRegression::ConstantAndTrend, max_lags)?;
    if with_trend.p_value < 0.05 {
        return Ok(with_trend);
    }
    let with_constant = adf_test(data, lags, AdfRegression::Constant, max_lags)?;
    if with_constant.p_value < 0.10 {
        return Ok(with_constant);
    }
    adf_test(data, lags, AdfRegression::None, max_lags)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Bundled diagnostics for a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub ljung_box_residuals: LjungBoxResult,
    pub ljung_box_squared: LjungBoxResult,
    pub jarque_bera: JarqueBeraResult,
    pub adf: Option<AdfResult>,
    /// "asymptotic" or "bootstrap"
    pub ljung_box_method: String,
    pub adf_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub innovation_distribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_t_df: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticOptions {
    pub ljung_box_lags: usize,
    pub include_adf: bool,
    pub innovation: InnovationDistribution,
    /// Use the bootstrap variants even for Normal innovations.
    pub force_bootstrap: bool,
    pub bootstrap_replications: usize,
    pub bootstrap_seed: u64,
}

impl Default for DiagnosticOptions {
    fn default() -> DiagnosticOptions {
        DiagnosticOptions {
            ljung_box_lags: 10,
            include_adf: true,
            innovation: InnovationDistribution::Normal,
            force_bootstrap: false,
            bootstrap_replications: 500,
            bootstrap_seed: 42,
        }
    }
}

/// Run the full test battery against a fitted model.
///
/// The Ljung-Box degrees of freedom are adjusted by the number of estimated
/// parameters; `ljung_box_lags` must exceed that count. For Student-t
/// innovations with df < 30, or when forced, the bootstrap procedures
/// replace the asymptotic p-values.
pub fn compute_diagnostics(
    data: &[f64],
    spec: &ArimaGarchSpec,
    params: &ArimaGarchParameters,
    options: &DiagnosticOptions,
) -> Result<DiagnosticReport> {
    if data.is_empty() {
        return Err(Error::InvalidArgument(
            "cannot compute diagnostics for an empty series".to_string(),
        ));
    }
    if options.ljung_box_lags == 0 {
        return Err(Error::InvalidArgument(
            "number of Ljung-Box lags must be positive".to_string(),
        ));
    }
    options.innovation.validate()?;

    let series = residual_series(data, spec, params)?;
    if series.standardized.len() < 4 {
        return Err(Error::InvalidArgument(
            "insufficient residuals for diagnostic tests (need at least 4)".to_string(),
        ));
    }

    let total_params = spec.param_count();
    if options.ljung_box_lags <= total_params {
        return Err(Error::InvalidArgument(format!(
            "Ljung-Box lags must exceed the number of estimated parameters ({total_params}); \
             increase the lags or use a simpler model"
        )));
    }
    let dof = options.ljung_box_lags - total_params;

    let squared: Vec<f64> = series.residuals.iter().map(|e| e * e).collect();

    let use_bootstrap = options.force_bootstrap
        || matches!(options.innovation, InnovationDistribution::StudentT { df } if df < 30.0);
    let method = if use_bootstrap {
        "bootstrap"
    } else {
        "asymptotic"
    };

    let (lb_residuals, lb_squared) = if use_bootstrap {
        let mut lb_res = crate::bootstrap::ljung_box_test_bootstrap(
            &series.residuals,
            options.ljung_box_lags,
            options.bootstrap_replications,
            options.bootstrap_seed,
        )?;
        lb_res.dof = dof;
        let mut lb_sq = crate::bootstrap::ljung_box_test_bootstrap(
            &squared,
            options.ljung_box_lags,
            options.bootstrap_replications,
            options.bootstrap_seed.wrapping_add(1),
        )?;
        lb_sq.dof = dof;
        (lb_res, lb_sq)
    } else {
        (
            ljung_box_test(&series.residuals, options.ljung_box_lags, Some(dof))?,
            ljung_box_test(&squared, options.ljung_box_lags, Some(dof))?,
        )
    };

    let jarque_bera = jarque_bera_test(&series.standardized)?;

    let adf = if options.include_adf {
        Some(if use_bootstrap {
            crate::bootstrap::adf_test_bootstrap(
                &series.residuals,
                None,
                AdfRegression::Constant,
                options.bootstrap_replications,
                options.bootstrap_seed.wrapping_add(2),
            )?
        } else {
            adf_test(&series.residuals, None, AdfRegression::Constant, None)?
        })
    } else {
        None
    };

    let (innovation_distribution, student_t_df) = match options.innovation {
        InnovationDistribution::Normal => (None, None),
        InnovationDistribution::StudentT { df } => (Some("Student-t".to_string()), Some(df)),
    };

    Ok(DiagnosticReport {
        ljung_box_residuals: lb_residuals,
        ljung_box_squared: lb_squared,
        jarque_bera,
        adf,
        ljung_box_method: method.to_string(),
        adf_method: method.to_string(),
        innovation_distribution,
        student_t_df,
    })
}
