use thiserror::Error;

/// Raised when a required oracle was not supplied to the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("rng oracle not available")]
    RngNotAvailable,

    #[error("tables oracle not available")]
    TablesNotAvailable,
}
