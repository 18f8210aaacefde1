use serde::{Deserialize, Serialize};

use crate::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};
use crate::{Error, Result};

/// Parameters of the conditional-mean equation.
///
/// `ar_coef` must have length `p`, `ma_coef` length `q` of the matching
/// [`ArimaSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArimaParameters {
    pub intercept: f64,
    pub ar_coef: Vec<f64>,
    pub ma_coef: Vec<f64>,
}

impl ArimaParameters {
    /// All-zero parameters shaped for `spec`.
    pub fn zeros(spec: &ArimaSpec) -> ArimaParameters {
        ArimaParameters {
            intercept: 0.0,
            ar_coef: vec![0.0; spec.p],
            ma_coef: vec![0.0; spec.q],
        }
    }

    pub fn validate_shape(&self, spec: &ArimaSpec) -> Result<()> {
        if self.ar_coef.len() != spec.p {
            return Err(Error::InvalidArgument(format!(
                "AR coefficient count {} does not match p = {}",
                self.ar_coef.len(),
                spec.p
            )));
        }
        if self.ma_coef.len() != spec.q {
            return Err(Error::InvalidArgument(format!(
                "MA coefficient count {} does not match q = {}",
                self.ma_coef.len(),
                spec.q
            )));
        }
        Ok(())
    }
}

/// Parameters of the conditional-variance equation.
///
/// `alpha_coef` (ARCH, length `q`) weights lagged squared residuals,
/// `beta_coef` (GARCH, length `p`) lagged conditional variances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarchParameters {
    pub omega: f64,
    pub alpha_coef: Vec<f64>,
    pub beta_coef: Vec<f64>,
}

impl GarchParameters {
    pub fn zeros(spec: &GarchSpec) -> GarchParameters {
        GarchParameters {
            omega: 0.0,
            alpha_coef: vec![0.0; spec.q],
            beta_coef: vec![0.0; spec.p],
        }
    }

    pub fn validate_shape(&self, spec: &GarchSpec) -> Result<()> {
        if self.alpha_coef.len() != spec.q {
            return Err(Error::InvalidArgument(format!(
                "ARCH coefficient count {} does not match q = {}",
                self.alpha_coef.len(),
                spec.q
            )));
        }
        if self.beta_coef.len() != spec.p {
            return Err(Error::InvalidArgument(format!(
                "GARCH coefficient count {} does not match p = {}",
                self.beta_coef.len(),
                spec.p
            )));
        }
        Ok(())
    }

    /// Positivity constraints: omega > 0, alpha_i >= 0, beta_j >= 0.
    pub fn is_positive(&self) -> bool {
        self.omega > 0.0
            && self.alpha_coef.iter().all(|&a| a >= 0.0)
            && self.beta_coef.iter().all(|&b| b >= 0.0)
    }

    /// Total persistence sum(alpha) + sum(beta).
    pub fn persistence(&self) -> f64 {
        self.alpha_coef.iter().sum::<f64>() + self.beta_coef.iter().sum::<f64>()
    }

    /// Covariance stationarity: persistence strictly below one.
    pub fn is_stationary(&self) -> bool {
        self.persistence() < 1.0
    }

    /// Unconditional variance omega / (1 - persistence); defined only when
    /// the parameters are stationary.
    pub fn unconditional_variance(&self) -> Option<f64> {
        if self.is_stationary() {
            Some(self.omega / (1.0 - self.persistence()))
        } else {
            None
        }
    }
}

/// Joint parameter bundle for the composite model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArimaGarchParameters {
    pub arima: ArimaParameters,
    pub garch: GarchParameters,
}

impl ArimaGarchParameters {
    pub fn zeros(spec: &ArimaGarchSpec) -> ArimaGarchParameters {
        ArimaGarchParameters {
            arima: ArimaParameters::zeros(&spec.arima),
            garch: GarchParameters::zeros(&spec.garch),
        }
    }

    pub fn validate_shape(&self, spec: &ArimaGarchSpec) -> Result<()> {
        self.arima.validate_shape(&spec.arima)?;
        self.garch.validate_shape(&spec.garch)
    }

    /// Flatten into the optimiser's parameter vector. Layout:
    /// `[intercept, ar.., ma..]` when the ARIMA part is non-trivial, then
    /// `[omega, alpha.., beta..]`.
    pub fn pack(&self, spec: &ArimaGarchSpec) -> Vec<f64> {
        let mut theta = Vec::with_capacity(spec.param_count());
        if !spec.arima.is_zero_order() {
            theta.push(self.arima.intercept);
            theta.extend_from_slice(&self.arima.ar_coef);
            theta.extend_from_slice(&self.arima.ma_coef);
        }
        theta.push(self.garch.omega);
        theta.extend_from_slice(&self.garch.alpha_coef);
        theta.extend_from_slice(&self.garch.beta_coef);
        theta
    }

    /// Inverse of [`pack`](Self::pack).
    pub fn unpack(spec: &ArimaGarchSpec, theta: &[f64]) -> Result<ArimaGarchParameters> {
        if theta.len() != spec.param_count() {
            return Err(Error::InvalidArgument(format!(
                "parameter vector length {} does not match spec {} (expected {})",
                theta.len(),
                spec,
                spec.param_count()
            )));
        }
        let mut params = ArimaGarchParameters::zeros(spec);
        let mut idx = 0;
        if !spec.arima.is_zero_order() {
            params.arima.intercept = theta[idx];
            idx += 1;
            for i in 0..spec.arima.p {
                params.arima.ar_coef[i] = theta[idx];
                idx += 1;
            }
            for i in 0..spec.arima.q {
                params.arima.ma_coef[i] = theta[idx];
                idx += 1;
            }
        }
        params.garch.omega = theta[idx];
        idx += 1;
        for i in 0..spec.garch.q {
            params.garch.alpha_coef[i] = theta[idx];
            idx += 1;
        }
        for i in 0..spec.garch.p {
            params.garch.beta_coef[i] = theta[idx];
            idx += 1;
        }
        Ok(params)
    }
}
