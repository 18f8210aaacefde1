//! Gaussian negative log-likelihood of the composite model.

use crate::params::ArimaGarchParameters;
use crate::spec::ArimaGarchSpec;
use crate::{arima, garch};
use crate::{Error, Result};

/// Objective value assigned to infeasible or numerically failed parameter
/// points inside the optimiser.
pub const PENALTY: f64 = 1e10;

/// Gaussian NLL, ignoring the 2*pi constant:
///
/// NLL = 1/2 * sum_t ( ln h_t + eps_t^2 / h_t )
///
/// Composes the ARIMA residual filter and the GARCH variance filter and
/// fails on non-positive variances or non-finite intermediates.
pub fn negative_log_likelihood(
    data: &[f64],
    spec: &ArimaGarchSpec,
    params: &ArimaGarchParameters,
) -> Result<f64> {
    let residuals = arima::compute_residuals(data, &spec.arima, &params.arima)?;
    let variances = garch::compute_conditional_variances(&residuals, &spec.garch, &params.garch)?;

    let mut nll = 0.0;
    for (eps, h) in residuals.iter().zip(variances.iter()) {
        if *h <= 0.0 {
            return Err(Error::Numerical(
                "non-positive conditional variance in likelihood".to_string(),
            ));
        }
        nll += 0.5 * (h.ln() + eps * eps / h);
    }
    if !nll.is_finite() {
        return Err(Error::Numerical(format!(
            "non-finite log-likelihood value {nll}"
        )));
    }
    Ok(nll)
}

/// Wrap the NLL as an unconstrained objective over the packed parameter
/// vector. Constraint violations and evaluation failures become the finite
/// penalty [`PENALTY`]; this is the sole mechanism excluding inadmissible
/// parameter regions from the search.
pub fn penalized_objective<'a>(
    data: &'a [f64],
    spec: &'a ArimaGarchSpec,
) -> impl Fn(&[f64]) -> f64 + 'a {
    move |theta: &[f64]| {
        let params = match ArimaGarchParameters::unpack(spec, theta) {
            Ok(p) => p,
            Err(_) => return PENALTY,
        };
        if !params.garch.is_positive() || !params.garch.is_stationary() {
            return PENALTY;
        }
        match negative_log_likelihood(data, spec, &params) {
            Ok(nll) if nll.is_finite() => nll,
            _ => PENALTY,
        }
    }
}
