//! Iterated multi-step mean and variance forecasts.
//!
//! The forecaster clones the model's final filter windows and iterates both
//! recursions forward. Future residuals have expectation zero, so squared
//! residuals are replaced by their forecast variances:
//! E[eps^2_{t+k}] = h_{t+k}. For stationary GARCH parameters the variance
//! forecasts converge geometrically to omega / (1 - persistence).

use crate::garch::MIN_VARIANCE;
use crate::model::ArimaGarchModel;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub mean_forecasts: Vec<f64>,
    pub variance_forecasts: Vec<f64>,
}

/// Forecast `horizon` steps ahead from the model's current state.
pub fn forecast(model: &ArimaGarchModel, horizon: usize) -> Result<ForecastResult> {
    if horizon == 0 {
        return Err(Error::InvalidArgument(
            "forecast horizon must be positive".to_string(),
        ));
    }

    let spec = model.spec();
    let params = model.params();
    let p = spec.arima.p;
    let q = spec.arima.q;
    let gp = spec.garch.p;
    let gq = spec.garch.q;

    let mut obs_window = model.mean_state().observation_window().to_vec();
    let mut res_window = model.mean_state().residual_window().to_vec();
    let mut var_window = model.var_state().variance_window().to_vec();
    let mut sq_res_window = model.var_state().squared_residual_window().to_vec();

    let mut mean_forecasts = Vec::with_capacity(horizon);
    let mut variance_forecasts = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let mut mean = params.arima.intercept;
        for i in 0..p {
            mean += params.arima.ar_coef[i] * obs_window[p - 1 - i];
        }
        for j in 0..q {
            mean += params.arima.ma_coef[j] * res_window[q - 1 - j];
        }

        let mut variance = params.garch.omega;
        for i in 0..gq {
            variance += params.garch.alpha_coef[i] * sq_res_window[gq - 1 - i];
        }
        for j in 0..gp {
            variance += params.garch.beta_coef[j] * var_window[gp - 1 - j];
        }
        let variance = variance.max(MIN_VARIANCE);

        mean_forecasts.push(mean);
        variance_forecasts.push(variance);

        // advance the windows with (mu, 0, h, h)
        if p > 0 {
            obs_window.rotate_left(1);
            obs_window[p - 1] = mean;
        }
        if q > 0 {
            res_window.rotate_left(1);
            res_window[q - 1] = 0.0;
        }
        var_window.rotate_left(1);
        var_window[gp - 1] = variance;
        sq_res_window.rotate_left(1);
        sq_res_window[gq - 1] = variance;
    }

    Ok(ForecastResult {
        mean_forecasts,
        variance_forecasts,
    })
}
