//! Error types for the session layer.

use std::time::Duration;

use csc_core::InputValidationError;

/// Failure to obtain a well-formed answer from the solver.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Calculation timeout after {after:?}")]
    Timeout { after: Duration },

    #[error("Solver channel closed")]
    ChannelClosed,

    #[error("Solver error: {message}")]
    Backend { message: String },

    #[error("Invalid result format: {message}")]
    Malformed { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid input: {0}")]
    Validation(#[from] InputValidationError),

    #[error("A calculation is already running")]
    Busy,
}

pub type SessionResult<T> = Result<T, SessionError>;
