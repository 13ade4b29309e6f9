//! Error types for isochrone computation and its collaborators.

use thiserror::Error;

/// Errors raised by geocoders and travel-time oracles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The address to resolve was blank.
    #[error("address cannot be blank")]
    EmptyAddress,

    /// Transport-level failure (connect, timeout, non-2xx).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status for the whole request.
    #[error("provider returned status {status}")]
    Status { status: String },

    /// The response could not be decoded or was inconsistent with the request.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by [`crate::orchestrator::solve`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsochroneError {
    /// Blank or malformed origin, duration, spoke count, or other setting.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Batch-level failure reported by the geocoder or oracle.
    #[error(transparent)]
    Provider(ProviderError),

    /// The round cap was reached without every spoke stabilizing.
    #[error("no convergence after {rounds} rounds")]
    ConvergenceTimeout { rounds: usize },
}

impl From<ProviderError> for IsochroneError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::EmptyAddress => IsochroneError::InvalidInput(e.to_string()),
            other => IsochroneError::Provider(other),
        }
    }
}

pub type Result<T, E = IsochroneError> = std::result::Result<T, E>;
