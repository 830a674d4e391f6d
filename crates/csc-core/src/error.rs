use thiserror::Error;

pub type ValidationResult<T> = Result<T, InputValidationError>;

/// Rejections raised before a calculation is handed to the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputValidationError {
    #[error("Please enter a chemical equation")]
    EmptyEquation,

    #[error("Target mass must be a positive number (got {value})")]
    TargetMass { value: f64 },

    #[error("Output precision must be between 0 and 20 (got {value})")]
    OutputPrecision { value: u8 },

    #[error("Float tolerance must be between 1 and 15 (got {value})")]
    FloatTolerance { value: u8 },

    #[error("Max combinations must be at least 1 (got {value})")]
    MaxComb { value: u32 },

    #[error("Unknown {what}: {value}")]
    UnknownVariant { what: &'static str, value: String },
}
