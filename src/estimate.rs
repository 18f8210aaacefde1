//! Fit an ARIMA-GARCH model by maximum likelihood.
//!
//! The pipeline is: seed parameters from ACF/PACF and the sample variance,
//! minimise the penalised Gaussian NLL with Nelder-Mead plus seeded
//! restarts, compute information criteria, replay the working series
//! through the fitted model, and optionally attach residual diagnostics.

use crate::diagnostics::{self, DiagnosticOptions, DiagnosticReport};
use crate::likelihood;
use crate::model::ArimaGarchModel;
use crate::optimize::{self, NelderMead};
use crate::params::ArimaGarchParameters;
use crate::spec::ArimaGarchSpec;
use crate::{init, util};
use crate::{Error, Result};

const MIN_OBSERVATIONS: usize = 10;

/// Knobs for a single fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub optimizer: NelderMead,
    /// Additional optimisation runs from perturbed starting points.
    pub restarts: usize,
    /// Standard-deviation scale of the restart perturbations.
    pub perturbation_scale: f64,
    /// Seed for the restart RNG; the same seed reproduces the fit.
    pub seed: u64,
    pub compute_diagnostics: bool,
}

impl Default for FitOptions {
    fn default() -> FitOptions {
        FitOptions {
            optimizer: NelderMead::default(),
            restarts: 3,
            perturbation_scale: 0.15,
            seed: 0,
            compute_diagnostics: false,
        }
    }
}

/// Everything worth reporting about one fitted specification.
#[derive(Debug, Clone)]
pub struct FitSummary {
    pub spec: ArimaGarchSpec,
    pub parameters: ArimaGarchParameters,
    pub neg_log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub converged: bool,
    pub iterations: usize,
    pub message: String,
    pub sample_size: usize,
    pub diagnostics: Option<DiagnosticReport>,
}

impl FitSummary {
    /// Human-readable report, as printed by the CLI.
    pub fn text_report(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "=== {} fit summary ===", self.spec);
        let _ = writeln!(out, "Observations: {}", self.sample_size);
        let _ = writeln!(
            out,
            "Converged: {} after {} iterations ({})",
            self.converged, self.iterations, self.message
        );
        let _ = writeln!(out, "Neg. log-likelihood: {:.6}", self.neg_log_likelihood);
        let _ = writeln!(out, "AIC: {:.4}  BIC: {:.4}", self.aic, self.bic);

        if !self.spec.arima.is_zero_order() {
            let _ = writeln!(out, "Intercept: {:.6}", self.parameters.arima.intercept);
            for (i, phi) in self.parameters.arima.ar_coef.iter().enumerate() {
                let _ = writeln!(out, "AR[{}]: {:.6}", i + 1, phi);
            }
            for (i, theta) in self.parameters.arima.ma_coef.iter().enumerate() {
                let _ = writeln!(out, "MA[{}]: {:.6}", i + 1, theta);
            }
        }
        let _ = writeln!(out, "omega: {:.6}", self.parameters.garch.omega);
        for (i, alpha) in self.parameters.garch.alpha_coef.iter().enumerate() {
            let _ = writeln!(out, "alpha[{}]: {:.6}", i + 1, alpha);
        }
        for (i, beta) in self.parameters.garch.beta_coef.iter().enumerate() {
            let _ = writeln!(out, "beta[{}]: {:.6}", i + 1, beta);
        }
        let _ = writeln!(
            out,
            "Persistence: {:.6}",
            self.parameters.garch.persistence()
        );

        if let Some(diag) = &self.diagnostics {
            let _ = writeln!(
                out,
                "Ljung-Box (residuals): Q = {:.4}, p = {:.4}",
                diag.ljung_box_residuals.statistic, diag.ljung_box_residuals.p_value
            );
            let _ = writeln!(
                out,
                "Ljung-Box (squared):   Q = {:.4}, p = {:.4}",
                diag.ljung_box_squared.statistic, diag.ljung_box_squared.p_value
            );
            let _ = writeln!(
                out,
                "Jarque-Bera: JB = {:.4}, p = {:.4}",
                diag.jarque_bera.statistic, diag.jarque_bera.p_value
            );
            if let Some(adf) = &diag.adf {
                let _ = writeln!(
                    out,
                    "ADF: t = {:.4}, p = {:.4} ({} lags)",
                    adf.statistic, adf.p_value, adf.lags
                );
            }
        }
        out
    }
}

/// A fitted model together with its summary. The model state has been
/// replayed over the working series, so it is ready for forecasting.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub model: ArimaGarchModel,
    pub summary: FitSummary,
}

/// Akaike information criterion 2k - 2l.
pub fn aic(log_likelihood: f64, k: usize) -> f64 {
    2.0 * k as f64 - 2.0 * log_likelihood
}

/// Bayesian information criterion k ln(n) - 2l.
pub fn bic(log_likelihood: f64, k: usize, n: usize) -> f64 {
    k as f64 * (n as f64).ln() - 2.0 * log_likelihood
}

/// Corrected AIC; undefined when n <= k + 1.
pub fn aicc(log_likelihood: f64, k: usize, n: usize) -> Result<f64> {
    if n <= k + 1 {
        return Err(Error::InvalidArgument(format!(
            "AICc requires n > k + 1, got n = {n}, k = {k}"
        )));
    }
    let kf = k as f64;
    Ok(aic(log_likelihood, k) + 2.0 * kf * (kf + 1.0) / (n as f64 - kf - 1.0))
}

/// Fit `spec` to `data` by maximum likelihood.
///
/// Non-convergence is reported through `FitSummary::converged`, not as an
/// error; callers such as model selection treat those fits as failed.
pub fn fit(data: &[f64], spec: &ArimaGarchSpec, options: &FitOptions) -> Result<FitResult> {
    spec.validate()?;
    if data.len() < MIN_OBSERVATIONS {
        return Err(Error::InvalidArgument(format!(
            "insufficient data: need at least {MIN_OBSERVATIONS} observations, got {}",
            data.len()
        )));
    }
    if data.len() <= spec.param_count() {
        return Err(Error::InvalidArgument(format!(
            "insufficient data: {} observations for {} parameters",
            data.len(),
            spec.param_count()
        )));
    }
    if let Some(bad) = data.iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidArgument(format!(
            "series contains a non-finite value: {bad}"
        )));
    }

    let initial = init::initialize_parameters(data, spec)?;
    let theta0 = initial.pack(spec);

    let objective = likelihood::penalized_objective(data, spec);
    let opt = optimize::optimize_with_restarts(
        &options.optimizer,
        objective,
        &theta0,
        options.restarts,
        options.perturbation_scale,
        options.seed,
    )?;

    let parameters = ArimaGarchParameters::unpack(spec, &opt.parameters)?;
    let nll = opt.objective_value;
    let n = data.len();
    let k = spec.param_count();
    let log_likelihood = -nll;

    let mut summary = FitSummary {
        spec: *spec,
        parameters: parameters.clone(),
        neg_log_likelihood: nll,
        aic: aic(log_likelihood, k),
        bic: bic(log_likelihood, k, n),
        converged: opt.converged,
        iterations: opt.iterations,
        message: opt.message,
        sample_size: n,
        diagnostics: None,
    };

    // bring the model state up to date for forecasting
    let mut model = ArimaGarchModel::new(*spec, parameters)?;
    let working = if spec.arima.d > 0 {
        util::diff(data, spec.arima.d)
    } else {
        data.to_vec()
    };
    model.replay(&working);

    if options.compute_diagnostics {
        let lags = 10.min(n / 5).max(k + 1);
        let diag_options = DiagnosticOptions {
            ljung_box_lags: lags,
            ..DiagnosticOptions::default()
        };
        match diagnostics::compute_diagnostics(data, spec, model.params(), &diag_options) {
            Ok(report) => summary.diagnostics = Some(report),
            Err(e) => {
                tracing::warn!(error = %e, "diagnostics failed; returning fit without them");
            }
        }
    }

    Ok(FitResult { model, summary })
}
