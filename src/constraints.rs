//! Smooth reparametrisation of the GARCH constraint set.
//!
//! Alternative to the penalty-based handling in [`crate::likelihood`]:
//! omega = exp(theta_0), and the ARCH/GARCH block is mapped through a
//! normalised exponential so its sum stays below [`MAX_PERSISTENCE`]. Useful
//! where a gradient-based optimiser needs an unconstrained domain.

use crate::{Error, Result};

/// Upper bound imposed on sum(alpha) + sum(beta) by the transform.
pub const MAX_PERSISTENCE: f64 = 0.99;

const EPSILON: f64 = 1e-12;

/// Map an unconstrained vector `[theta_0, theta_1..theta_{P+Q}]` to GARCH
/// parameters `[omega, coef_1..coef_{P+Q}]` satisfying positivity and the
/// persistence bound.
pub fn to_constrained(theta: &[f64], p: usize, q: usize) -> Result<Vec<f64>> {
    let expected = 1 + p + q;
    if theta.len() != expected {
        return Err(Error::InvalidArgument(format!(
            "theta length {} does not match 1 + p + q = {expected}",
            theta.len()
        )));
    }
    if p < 1 || q < 1 {
        return Err(Error::InvalidArgument(
            "GARCH orders must be at least 1".to_string(),
        ));
    }

    let mut params = vec![0.0; expected];
    params[0] = theta[0].exp();

    let exp_values: Vec<f64> = theta[1..].iter().map(|t| t.exp()).collect();
    let sum_exp: f64 = exp_values.iter().sum();

    // scaled_i = MAX_PERSISTENCE * exp(theta_i) / (1 + sum_j exp(theta_j)),
    // so the block sum is strictly below MAX_PERSISTENCE
    let scale = MAX_PERSISTENCE / (1.0 + sum_exp);
    for (out, e) in params[1..].iter_mut().zip(exp_values.iter()) {
        *out = e * scale;
    }
    Ok(params)
}

/// Approximate inverse of [`to_constrained`].
///
/// The normalised exponential is not exactly invertible coefficient-wise;
/// the scale factor is estimated from the coefficient sum, which recovers
/// the forward transform to within the persistence-bound approximation.
pub fn to_unconstrained(params: &[f64], p: usize, q: usize) -> Result<Vec<f64>> {
    let expected = 1 + p + q;
    if params.len() != expected {
        return Err(Error::InvalidArgument(format!(
            "params length {} does not match 1 + p + q = {expected}",
            params.len()
        )));
    }
    if !validate(params, p, q) {
        return Err(Error::InvalidArgument(
            "parameters violate GARCH constraints".to_string(),
        ));
    }

    let mut theta = vec![0.0; expected];
    theta[0] = params[0].ln();

    let sum_coeffs: f64 = params[1..].iter().sum();
    let sum_exp_estimate = sum_coeffs / (MAX_PERSISTENCE - sum_coeffs + EPSILON);
    let scale_estimate = MAX_PERSISTENCE / (1.0 + sum_exp_estimate);

    for (out, c) in theta[1..].iter_mut().zip(params[1..].iter()) {
        let value = c / (scale_estimate + EPSILON);
        *out = value.max(EPSILON).ln();
    }
    Ok(theta)
}

/// Check positivity and stationarity of a `[omega, coef..]` vector.
pub fn validate(params: &[f64], p: usize, q: usize) -> bool {
    if params.len() != 1 + p + q || p < 1 || q < 1 {
        return false;
    }
    if params[0] <= 0.0 {
        return false;
    }
    if params[1..].iter().any(|&c| c < 0.0) {
        return false;
    }
    params[1..].iter().sum::<f64>() < 1.0
}
