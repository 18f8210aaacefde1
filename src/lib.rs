pub mod acf;
pub mod arima;
pub mod bootstrap;
pub mod constraints;
pub mod diagnostics;
pub mod estimate;
pub mod forecast;
pub mod garch;
pub mod init;
pub mod io;
pub mod likelihood;
pub mod model;
pub mod optimize;
pub mod params;
pub mod select;
pub mod sim;
pub mod spec;
pub mod stats;
pub mod util;

use thiserror::Error as ThisError;

/// Errors produced by the library.
///
/// Invalid inputs and constraint violations surface as `InvalidArgument`;
/// non-finite intermediates and non-positive variances as `Numerical`.
/// Inside the optimiser both are trapped and mapped to the penalty value
/// instead (see [`likelihood::PENALTY`]).
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("did not converge: {0}")]
    NonConvergence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
