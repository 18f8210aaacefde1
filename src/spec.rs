use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// ARIMA(p,d,q) order specification.
///
/// `p` is the autoregressive order, `d` the differencing degree and `q` the
/// moving-average order. All orders may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaSpec {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaSpec {
    pub fn new(p: usize, d: usize, q: usize) -> ArimaSpec {
        ArimaSpec { p, d, q }
    }

    /// True for ARIMA(0,0,0), in which case the mean equation contributes no
    /// estimated parameters.
    pub fn is_zero_order(&self) -> bool {
        self.p == 0 && self.d == 0 && self.q == 0
    }

    pub fn has_differencing(&self) -> bool {
        self.d > 0
    }
}

/// GARCH(p,q) order specification.
///
/// `p` counts lagged conditional variances, `q` lagged squared residuals.
/// Both orders must be at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarchSpec {
    pub p: usize,
    pub q: usize,
}

impl GarchSpec {
    pub fn new(p: usize, q: usize) -> Result<GarchSpec> {
        if p < 1 {
            return Err(Error::InvalidArgument(format!(
                "GARCH order p must be >= 1, got {p}"
            )));
        }
        if q < 1 {
            return Err(Error::InvalidArgument(format!(
                "GARCH order q must be >= 1, got {q}"
            )));
        }
        Ok(GarchSpec { p, q })
    }

    /// Re-check the invariant, e.g. after deserialisation.
    pub fn validate(&self) -> Result<()> {
        GarchSpec::new(self.p, self.q).map(|_| ())
    }
}

/// Joint specification of the conditional mean and variance equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaGarchSpec {
    pub arima: ArimaSpec,
    pub garch: GarchSpec,
}

impl ArimaGarchSpec {
    pub fn new(arima: ArimaSpec, garch: GarchSpec) -> ArimaGarchSpec {
        ArimaGarchSpec { arima, garch }
    }

    /// Number of parameters estimated by maximum likelihood: intercept plus
    /// AR and MA coefficients when the ARIMA part is non-trivial, plus omega
    /// and the ARCH/GARCH coefficients.
    pub fn param_count(&self) -> usize {
        let arima_params = if self.arima.is_zero_order() {
            0
        } else {
            1 + self.arima.p + self.arima.q
        };
        arima_params + 1 + self.garch.p + self.garch.q
    }

    pub fn validate(&self) -> Result<()> {
        self.garch.validate()
    }
}

impl std::fmt::Display for ArimaGarchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ARIMA({},{},{})-GARCH({},{})",
            self.arima.p, self.arima.d, self.arima.q, self.garch.p, self.garch.q
        )
    }
}
