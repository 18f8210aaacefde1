//! Composite ARIMA-GARCH model.
//!
//! The composite owns both filter states and the parameter bundle and
//! exposes a single `update(y_t) -> (mu_t, h_t)` step. It operates on the
//! working series: when d > 0 the caller feeds it differenced observations.

use crate::arima::ArimaState;
use crate::garch::{GarchState, MIN_VARIANCE};
use crate::params::ArimaGarchParameters;
use crate::spec::ArimaGarchSpec;
use crate::{Error, Result};

/// One filter step: conditional mean and variance of the current
/// observation given the information set at t-1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    pub mean: f64,
    pub variance: f64,
}

#[derive(Debug, Clone)]
pub struct ArimaGarchModel {
    spec: ArimaGarchSpec,
    params: ArimaGarchParameters,
    mean_state: ArimaState,
    var_state: GarchState,
}

impl ArimaGarchModel {
    /// Build a model with fresh state. The GARCH window is seeded with the
    /// unconditional variance when the parameters are stationary, with omega
    /// otherwise.
    pub fn new(spec: ArimaGarchSpec, params: ArimaGarchParameters) -> Result<ArimaGarchModel> {
        spec.validate()?;
        params.validate_shape(&spec)?;
        if !params.garch.is_positive() {
            return Err(Error::InvalidArgument(
                "GARCH parameters must satisfy omega > 0, alpha >= 0, beta >= 0".to_string(),
            ));
        }

        let h0 = params
            .garch
            .unconditional_variance()
            .filter(|v| *v > 0.0)
            .unwrap_or(params.garch.omega)
            .max(MIN_VARIANCE);

        Ok(ArimaGarchModel {
            mean_state: ArimaState::new(&spec.arima),
            var_state: GarchState::new(&spec.garch, h0),
            spec,
            params,
        })
    }

    /// Build a model around previously saved filter state.
    pub fn with_state(
        spec: ArimaGarchSpec,
        params: ArimaGarchParameters,
        mean_state: ArimaState,
        var_state: GarchState,
    ) -> Result<ArimaGarchModel> {
        spec.validate()?;
        params.validate_shape(&spec)?;
        if !params.garch.is_positive() {
            return Err(Error::InvalidArgument(
                "GARCH parameters must satisfy omega > 0, alpha >= 0, beta >= 0".to_string(),
            ));
        }
        Ok(ArimaGarchModel {
            spec,
            params,
            mean_state,
            var_state,
        })
    }

    /// Advance both filters by one observation of the working series.
    pub fn update(&mut self, y: f64) -> ModelOutput {
        let mu = self.mean_state.conditional_mean(&self.params.arima);
        let eps = y - mu;
        let h = self
            .var_state
            .conditional_variance(&self.params.garch)
            .max(MIN_VARIANCE);

        self.mean_state.update(y, eps);
        self.var_state.update(h, eps * eps);

        ModelOutput {
            mean: mu,
            variance: h,
        }
    }

    /// Feed a whole series through the model, discarding the outputs. Used
    /// to bring the state up to date before forecasting or simulating.
    pub fn replay(&mut self, working_series: &[f64]) {
        for &y in working_series {
            self.update(y);
        }
    }

    pub fn spec(&self) -> &ArimaGarchSpec {
        &self.spec
    }

    pub fn params(&self) -> &ArimaGarchParameters {
        &self.params
    }

    pub fn mean_state(&self) -> &ArimaState {
        &self.mean_state
    }

    pub fn var_state(&self) -> &GarchState {
        &self.var_state
    }
}
