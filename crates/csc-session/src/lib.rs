//! Calculation session control for chemsynthcalc.
//!
//! The [`CalculationSessionController`] owns the single remote calculation slot:
//! it enforces single-flight submission, turns a second submit into a cancel
//! request, races the solver against a deadline, and funnels every settlement
//! through [`ResultInterpreter`] before publishing the new [`SessionState`].

pub mod controller;
pub mod error;
pub mod interpret;
pub mod port;
pub mod state;

pub use controller::{
    CalculationSessionController, DEFAULT_CALCULATION_TIMEOUT, SessionObserver, SessionOptions,
    SubmitOutcome,
};
pub use error::{SessionError, SessionResult, TransportError};
pub use interpret::{GENERIC_FAILURE, Outcome, ResultInterpreter};
pub use port::{RawResponse, RemoteCalculationPort};
pub use state::{ERROR_PREFIX, Phase, SessionId, SessionState, SessionStatus};
