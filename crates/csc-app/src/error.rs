//! Error types for the csc-app service layer.

/// Unified error for the CLI and any other front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(#[from] csc_core::InputValidationError),

    #[error("Session error: {0}")]
    Session(#[from] csc_session::SessionError),

    #[error("Solver error: {0}")]
    Transport(#[from] csc_session::TransportError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] csc_state::PersistenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
