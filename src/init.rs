//! Starting values for maximum-likelihood estimation.
//!
//! ARIMA coefficients are seeded from the sample PACF/ACF of the working
//! series; GARCH coefficients target a total persistence of 0.90 split
//! 30/70 between ARCH and GARCH effects.

use crate::params::{ArimaGarchParameters, ArimaParameters, GarchParameters};
use crate::spec::{ArimaGarchSpec, ArimaSpec, GarchSpec};
use crate::{acf, arima, stats, util};
use crate::{Error, Result};

const MIN_OBSERVATIONS: usize = 10;
const TARGET_PERSISTENCE: f64 = 0.90;
const ARCH_SHARE: f64 = 0.30;
const GARCH_SHARE: f64 = 0.70;

/// Seed the conditional-mean parameters from the data.
///
/// Intercept: sample mean of the (differenced) series. AR coefficients:
/// PACF values scaled by 0.9. MA coefficients: negated ACF values scaled by
/// 0.9. Falls back to `0.1 / (i + 1)` when the ACF/PACF evaluation fails.
pub fn initialize_arima_parameters(data: &[f64], spec: &ArimaSpec) -> Result<ArimaParameters> {
    if data.len() < MIN_OBSERVATIONS {
        return Err(Error::InvalidArgument(format!(
            "insufficient data for parameter initialization (need at least {MIN_OBSERVATIONS})"
        )));
    }

    let working = if spec.d > 0 {
        let differenced = util::diff(data, spec.d);
        if differenced.len() < MIN_OBSERVATIONS {
            return Err(Error::InvalidArgument(
                "insufficient data after differencing".to_string(),
            ));
        }
        differenced
    } else {
        data.to_vec()
    };

    let mut params = ArimaParameters::zeros(spec);
    params.intercept = util::mean(&working);

    if spec.p > 0 {
        let max_lag = spec.p.min(working.len() / 4);
        match (max_lag > 0)
            .then(|| acf::pacf(&working, max_lag))
            .transpose()
        {
            Ok(Some(pacf_values)) => {
                for i in 0..spec.p.min(pacf_values.len()) {
                    // scale down to promote a stable starting point
                    params.ar_coef[i] = 0.9 * pacf_values[i];
                }
            }
            _ => {
                for i in 0..spec.p {
                    params.ar_coef[i] = 0.1 / (i + 1) as f64;
                }
            }
        }
    }

    if spec.q > 0 {
        let max_lag = spec.q.min(working.len() / 4);
        match (max_lag > 0)
            .then(|| acf::acf(&working, max_lag))
            .transpose()
        {
            Ok(Some(acf_values)) => {
                for i in 0..spec.q {
                    if i + 1 < acf_values.len() {
                        params.ma_coef[i] = -0.9 * acf_values[i + 1];
                    }
                }
            }
            _ => {
                for i in 0..spec.q {
                    params.ma_coef[i] = 0.1 / (i + 1) as f64;
                }
            }
        }
    }

    Ok(params)
}

/// Seed the conditional-variance parameters from a residual series.
pub fn initialize_garch_parameters(residuals: &[f64], spec: &GarchSpec) -> Result<GarchParameters> {
    if residuals.len() < MIN_OBSERVATIONS {
        return Err(Error::InvalidArgument(format!(
            "insufficient residuals for parameter initialization (need at least {MIN_OBSERVATIONS})"
        )));
    }

    let mut sample_var = stats::sample_variance(residuals);
    if sample_var <= 0.0 {
        sample_var = 1.0;
    }

    let mut params = GarchParameters::zeros(spec);

    // allocate the persistence budget; everything goes to whichever block
    // is present when the other is absent
    let alpha_total = if spec.p == 0 {
        TARGET_PERSISTENCE
    } else {
        TARGET_PERSISTENCE * ARCH_SHARE
    };
    let beta_total = if spec.q == 0 {
        TARGET_PERSISTENCE
    } else {
        TARGET_PERSISTENCE * GARCH_SHARE
    };

    // alpha spread uniformly across the ARCH block
    if spec.q > 0 {
        let alpha_each = alpha_total / spec.q as f64;
        for a in params.alpha_coef.iter_mut() {
            *a = alpha_each;
        }
    }

    // beta tapered harmonically, renormalised to the beta budget
    if spec.p > 0 {
        let weight_sum: f64 = (0..spec.p).map(|j| 1.0 / (j + 1) as f64).sum();
        for (j, b) in params.beta_coef.iter_mut().enumerate() {
            *b = beta_total * (1.0 / (j + 1) as f64) / weight_sum;
        }
    }

    params.omega = sample_var * (1.0 - params.persistence());
    if params.omega <= 0.0 {
        params.omega = 0.01 * sample_var;
    }

    Ok(params)
}

/// Joint initialisation: seed the ARIMA parameters, filter the data with
/// them, then seed the GARCH parameters from the resulting residuals.
pub fn initialize_parameters(
    data: &[f64],
    spec: &ArimaGarchSpec,
) -> Result<ArimaGarchParameters> {
    let arima_params = initialize_arima_parameters(data, &spec.arima)?;
    let residuals = arima::compute_residuals(data, &spec.arima, &arima_params)?;
    if residuals.is_empty() {
        return Err(Error::InvalidArgument(
            "no residuals available for GARCH initialization".to_string(),
        ));
    }
    let garch_params = initialize_garch_parameters(&residuals, &spec.garch)?;
    Ok(ArimaGarchParameters {
        arima: arima_params,
        garch: garch_params,
    })
}
