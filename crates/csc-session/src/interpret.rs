//! Classification of raw solver replies.

use csc_core::{CalculationResult, TabularRow};
use serde_json::Value;

use crate::error::TransportError;
use crate::port::RawResponse;

/// Message used when the solver reports failure without saying why.
pub const GENERIC_FAILURE: &str = "Calculation failed";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        details: String,
        tabular: Vec<TabularRow>,
    },
    DomainError {
        message: String,
    },
    Cancelled,
    TransportError {
        message: String,
    },
}

/// Pure mapping from a settled remote call to an [`Outcome`].
pub struct ResultInterpreter;

impl ResultInterpreter {
    /// Classify a settlement.
    ///
    /// Precedence: the session's abort flag, then `cancelled`, then `success`,
    /// otherwise a domain error. Replies that do not have the result shape are
    /// transport errors.
    pub fn classify(raw: Result<RawResponse, TransportError>, aborted: bool) -> Outcome {
        if aborted {
            return Outcome::Cancelled;
        }

        let result = match raw.and_then(Self::parse) {
            Ok(result) => result,
            Err(err) => {
                return Outcome::TransportError {
                    message: err.to_string(),
                };
            }
        };

        Self::classify_result(result)
    }

    pub fn classify_result(result: CalculationResult) -> Outcome {
        if result.cancelled {
            Outcome::Cancelled
        } else if result.success {
            Outcome::Success {
                details: result.details,
                tabular: result.tabular,
            }
        } else {
            let message = if result.message.trim().is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                result.message
            };
            Outcome::DomainError { message }
        }
    }

    /// Structural validation against the [`CalculationResult`] shape.
    pub fn parse(raw: RawResponse) -> Result<CalculationResult, TransportError> {
        let parsed = match raw {
            Value::String(text) => serde_json::from_str(&text),
            other => serde_json::from_value(other),
        };
        parsed.map_err(|err| TransportError::Malformed {
            message: err.to_string(),
        })
    }
}
