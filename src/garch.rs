//! GARCH(p,q) conditional-variance filter.
//!
//! h_t = omega + sum_i alpha_i * eps^2_{t-i} + sum_j beta_j * h_{t-j}
//!
//! [`GarchState`] keeps the p most recent conditional variances (seeded with
//! h_0) and the q most recent squared residuals (seeded with zero), both
//! oldest-first.

use crate::params::GarchParameters;
use crate::spec::GarchSpec;
use crate::stats;
use crate::{Error, Result};

/// Floor applied to every computed variance to absorb round-off.
pub const MIN_VARIANCE: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct GarchState {
    p: usize,
    q: usize,
    variance_window: Vec<f64>,
    sq_res_window: Vec<f64>,
    initial_variance: f64,
}

impl GarchState {
    /// State with the variance window filled with `h0` and the
    /// squared-residual window zeroed.
    pub fn new(spec: &GarchSpec, h0: f64) -> GarchState {
        GarchState {
            p: spec.p,
            q: spec.q,
            variance_window: vec![h0; spec.p],
            sq_res_window: vec![0.0; spec.q],
            initial_variance: h0,
        }
    }

    /// Rebuild a state from serialised windows.
    pub fn from_windows(
        spec: &GarchSpec,
        variance_window: Vec<f64>,
        sq_res_window: Vec<f64>,
        initial_variance: f64,
    ) -> Result<GarchState> {
        if variance_window.len() != spec.p {
            return Err(Error::InvalidArgument(format!(
                "variance window length {} does not match p = {}",
                variance_window.len(),
                spec.p
            )));
        }
        if sq_res_window.len() != spec.q {
            return Err(Error::InvalidArgument(format!(
                "squared-residual window length {} does not match q = {}",
                sq_res_window.len(),
                spec.q
            )));
        }
        Ok(GarchState {
            p: spec.p,
            q: spec.q,
            variance_window,
            sq_res_window,
            initial_variance,
        })
    }

    /// Conditional variance given the current windows.
    pub fn conditional_variance(&self, params: &GarchParameters) -> f64 {
        let mut h = params.omega;
        for i in 0..self.q {
            h += params.alpha_coef[i] * self.sq_res_window[self.q - 1 - i];
        }
        for j in 0..self.p {
            h += params.beta_coef[j] * self.variance_window[self.p - 1 - j];
        }
        h
    }

    /// Push a new variance/squared-residual pair, dropping the oldest.
    pub fn update(&mut self, conditional_variance: f64, squared_residual: f64) {
        self.variance_window.rotate_left(1);
        self.variance_window[self.p - 1] = conditional_variance;
        self.sq_res_window.rotate_left(1);
        self.sq_res_window[self.q - 1] = squared_residual;
    }

    pub fn variance_window(&self) -> &[f64] {
        &self.variance_window
    }

    pub fn squared_residual_window(&self) -> &[f64] {
        &self.sq_res_window
    }

    pub fn initial_variance(&self) -> f64 {
        self.initial_variance
    }
}

/// Starting variance h_0: unconditional variance for stationary parameters,
/// the sample variance of the residuals otherwise, always floored at
/// [`MIN_VARIANCE`].
pub fn initial_variance(residuals: &[f64], params: &GarchParameters) -> f64 {
    let h0 = params
        .unconditional_variance()
        .filter(|v| *v > 0.0)
        .unwrap_or_else(|| stats::sample_variance(residuals));
    h0.max(MIN_VARIANCE)
}

/// Run the variance recursion over a residual series.
///
/// Fails eagerly on shape or positivity violations and with a numerical
/// error if an update produces a non-positive variance before flooring.
pub fn compute_conditional_variances(
    residuals: &[f64],
    spec: &GarchSpec,
    params: &GarchParameters,
) -> Result<Vec<f64>> {
    params.validate_shape(spec)?;
    if !params.is_positive() {
        return Err(Error::InvalidArgument(
            "GARCH parameters must satisfy omega > 0, alpha >= 0, beta >= 0".to_string(),
        ));
    }
    if residuals.is_empty() {
        return Err(Error::InvalidArgument("empty residual series".to_string()));
    }

    let h0 = initial_variance(residuals, params);
    let mut state = GarchState::new(spec, h0);

    let mut variances = Vec::with_capacity(residuals.len());
    for &eps in residuals {
        let h = state.conditional_variance(params);
        if h <= 0.0 || !h.is_finite() {
            return Err(Error::Numerical(format!(
                "conditional variance update produced {h}"
            )));
        }
        let h = h.max(MIN_VARIANCE);
        variances.push(h);
        state.update(h, eps * eps);
    }
    Ok(variances)
}
