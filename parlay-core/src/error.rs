//! Error types for the engine

use thiserror::Error;

/// Engine-wide error type
///
/// Estimates are read-only and best-effort; every failure is surfaced as a
/// value so callers can decide whether to log, retry, or ignore. The
/// `NoConvergence` kind is deliberately distinct from a zero-value result:
/// it means the numerical solve failed (e.g. insufficient pool depth), not
/// that the trade is worthless.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("estimate cancelled")]
    Cancelled,

    #[error("estimate did not converge: {0}")]
    NoConvergence(String),

    #[error("malformed data: {0}")]
    Malformed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        EngineError::Unavailable(msg.into())
    }

    pub fn no_convergence(msg: impl Into<String>) -> Self {
        EngineError::NoConvergence(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        EngineError::Malformed(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
