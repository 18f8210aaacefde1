//! ARIMA(p,d,q) residual filter.
//!
//! [`ArimaState`] keeps the p most recent observations and the q most recent
//! residuals as bounded windows indexed oldest-first, plus the differenced
//! working series when d > 0. [`compute_residuals`] runs the one-step
//! conditional-mean recursion over the working series; replaying it on the
//! same data yields bit-identical residuals.

use crate::params::ArimaParameters;
use crate::spec::ArimaSpec;
use crate::util;
use crate::{Error, Result};

/// Mutable recursion state, exclusively owned by the filter (or by the
/// composite model).
#[derive(Debug, Clone)]
pub struct ArimaState {
    p: usize,
    q: usize,
    d: usize,
    obs_window: Vec<f64>,
    res_window: Vec<f64>,
    differenced: Vec<f64>,
}

impl ArimaState {
    /// Fresh state with zero-filled windows and no working series.
    pub fn new(spec: &ArimaSpec) -> ArimaState {
        ArimaState {
            p: spec.p,
            q: spec.q,
            d: spec.d,
            obs_window: vec![0.0; spec.p],
            res_window: vec![0.0; spec.q],
            differenced: Vec::new(),
        }
    }

    /// Rebuild a state from serialised windows.
    pub fn from_windows(
        spec: &ArimaSpec,
        obs_window: Vec<f64>,
        res_window: Vec<f64>,
    ) -> Result<ArimaState> {
        if obs_window.len() != spec.p {
            return Err(Error::InvalidArgument(format!(
                "observation window length {} does not match p = {}",
                obs_window.len(),
                spec.p
            )));
        }
        if res_window.len() != spec.q {
            return Err(Error::InvalidArgument(format!(
                "residual window length {} does not match q = {}",
                res_window.len(),
                spec.q
            )));
        }
        Ok(ArimaState {
            p: spec.p,
            q: spec.q,
            d: spec.d,
            obs_window,
            res_window,
            differenced: Vec::new(),
        })
    }

    /// Prepare the state for a filtering pass: difference the input when
    /// d > 0 and reset both windows to zero.
    ///
    /// Fails when the series is empty or when fewer than p observations
    /// remain after differencing.
    pub fn initialize(&mut self, data: &[f64]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidArgument("empty series".to_string()));
        }
        if self.d > 0 {
            self.differenced = util::diff(data, self.d);
        } else {
            self.differenced.clear();
        }
        if self.working_len(data.len()) < self.p {
            return Err(Error::InvalidArgument(format!(
                "insufficient observations after differencing: need at least p = {}",
                self.p
            )));
        }
        self.obs_window.iter_mut().for_each(|v| *v = 0.0);
        self.res_window.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    fn working_len(&self, input_len: usize) -> usize {
        if self.d > 0 {
            self.differenced.len()
        } else {
            input_len
        }
    }

    /// Conditional mean given the current windows:
    /// mu_t = c + sum phi_i * y_{t-i} + sum theta_j * eps_{t-j}.
    pub fn conditional_mean(&self, params: &ArimaParameters) -> f64 {
        let mut mu = params.intercept;
        // windows are oldest-first: obs_window[p-1] is y_{t-1}
        for i in 0..self.p {
            mu += params.ar_coef[i] * self.obs_window[self.p - 1 - i];
        }
        for j in 0..self.q {
            mu += params.ma_coef[j] * self.res_window[self.q - 1 - j];
        }
        mu
    }

    /// Push a new observation/residual pair, dropping the oldest entries.
    pub fn update(&mut self, observation: f64, residual: f64) {
        if self.p > 0 {
            self.obs_window.rotate_left(1);
            self.obs_window[self.p - 1] = observation;
        }
        if self.q > 0 {
            self.res_window.rotate_left(1);
            self.res_window[self.q - 1] = residual;
        }
    }

    /// The p most recent observations, oldest first.
    pub fn observation_window(&self) -> &[f64] {
        &self.obs_window
    }

    /// The q most recent residuals, oldest first.
    pub fn residual_window(&self) -> &[f64] {
        &self.res_window
    }

    /// The differenced working series (empty when d = 0).
    pub fn differenced_series(&self) -> &[f64] {
        &self.differenced
    }
}

/// Run the residual recursion over `data` and return the innovation series.
///
/// The output has length n - d. Missing lags at the start of the recursion
/// are treated as zero.
pub fn compute_residuals(
    data: &[f64],
    spec: &ArimaSpec,
    params: &ArimaParameters,
) -> Result<Vec<f64>> {
    params.validate_shape(spec)?;

    let mut state = ArimaState::new(spec);
    state.initialize(data)?;

    let n_work = state.working_len(data.len());
    let mut residuals = Vec::with_capacity(n_work);
    for t in 0..n_work {
        let y = if spec.d > 0 {
            state.differenced[t]
        } else {
            data[t]
        };
        let mu = state.conditional_mean(params);
        let eps = y - mu;
        residuals.push(eps);
        state.update(y, eps);
    }
    Ok(residuals)
}
