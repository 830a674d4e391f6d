//! csc-core: stable data model for chemsynthcalc sessions.
//!
//! Contains:
//! - params (calculation parameters, mode/algorithm/run-mode enums, validation)
//! - result (solver result shape and mass table rows)
//! - error (input validation errors)

pub mod error;
pub mod params;
pub mod result;

pub use error::{InputValidationError, ValidationResult};
pub use params::*;
pub use result::{CalculationResult, TabularRow};
