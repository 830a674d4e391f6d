//! Live session state owned by the controller.

use std::fmt;

use csc_core::{CalculationParams, CalculationResult};
use serde::{Deserialize, Serialize};

use crate::interpret::Outcome;

pub type SessionId = u64;

/// Prefix that marks a status message as an error report.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Settled,
}

/// Display-level status derived from the phase and the last outcome.
///
/// The serialized names are the ones written to snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "ready")]
    Idle,
    #[serde(rename = "calculating")]
    Running,
    #[serde(rename = "success")]
    Succeeded,
    #[serde(rename = "error")]
    Failed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "ready",
            SessionStatus::Running => "calculating",
            SessionStatus::Succeeded => "success",
            SessionStatus::Failed => "error",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a snapshot status name. Legacy encodings are handled by the codec.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "ready" => Some(SessionStatus::Idle),
            "calculating" => Some(SessionStatus::Running),
            "success" => Some(SessionStatus::Succeeded),
            "error" => Some(SessionStatus::Failed),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// Id of the most recent submission, if any.
    pub session_id: Option<SessionId>,
    pub last_params: Option<CalculationParams>,
    pub last_result: Option<CalculationResult>,
    pub last_error: Option<String>,
    /// Set when the last session ended through cancellation.
    pub cancelled: bool,
}

impl SessionState {
    pub(crate) fn running(session_id: SessionId, params: CalculationParams) -> Self {
        Self {
            phase: Phase::Running,
            session_id: Some(session_id),
            last_params: Some(params),
            last_result: None,
            last_error: None,
            cancelled: false,
        }
    }

    /// Settled with a successful result.
    pub fn succeeded(result: CalculationResult) -> Self {
        Self {
            phase: Phase::Settled,
            last_result: Some(result),
            ..Self::default()
        }
    }

    /// Settled with an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Settled,
            last_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn status(&self) -> SessionStatus {
        match self.phase {
            Phase::Running => SessionStatus::Running,
            Phase::Settled if self.last_error.is_some() => SessionStatus::Failed,
            Phase::Settled => SessionStatus::Succeeded,
            Phase::Idle if self.cancelled => SessionStatus::Cancelled,
            Phase::Idle => SessionStatus::Idle,
        }
    }

    /// The single human-readable line shown for the current outcome.
    pub fn status_message(&self) -> String {
        match self.status() {
            SessionStatus::Idle => "Ready".to_string(),
            SessionStatus::Running => "Calculating...".to_string(),
            SessionStatus::Succeeded => "Done".to_string(),
            SessionStatus::Cancelled => "Cancelled".to_string(),
            SessionStatus::Failed => {
                format!("{}{}", ERROR_PREFIX, self.last_error.as_deref().unwrap_or(""))
            }
        }
    }

    /// The last result, only if it settled successfully.
    pub fn success(&self) -> Option<&CalculationResult> {
        match self.phase {
            Phase::Settled => self.last_result.as_ref().filter(|r| r.success),
            _ => None,
        }
    }

    pub(crate) fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success { details, tabular } => {
                self.phase = Phase::Settled;
                self.last_result = Some(CalculationResult::success(details, tabular));
                self.last_error = None;
            }
            Outcome::DomainError { message } | Outcome::TransportError { message } => {
                self.phase = Phase::Settled;
                self.last_result = None;
                self.last_error = Some(message);
            }
            Outcome::Cancelled => {
                self.phase = Phase::Idle;
                self.last_result = None;
                self.last_error = None;
                self.cancelled = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_phase_and_outcome() {
        assert_eq!(SessionState::default().status(), SessionStatus::Idle);
        assert_eq!(SessionState::cancelled().status(), SessionStatus::Cancelled);
        assert_eq!(
            SessionState::failed("boom").status_message(),
            "Error: boom"
        );
        let ok = SessionState::succeeded(CalculationResult::success("2H2+O2=2H2O", vec![]));
        assert_eq!(ok.status(), SessionStatus::Succeeded);
        assert!(ok.success().is_some());
    }

    #[test]
    fn cancelled_settlement_returns_to_idle() {
        let mut state = SessionState::running(3, CalculationParams::default());
        state.settle(Outcome::Cancelled);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.status(), SessionStatus::Cancelled);
        assert_eq!(state.session_id, Some(3));
    }

    #[test]
    fn wire_names_round_trip() {
        for status in [
            SessionStatus::Idle,
            SessionStatus::Running,
            SessionStatus::Succeeded,
            SessionStatus::Failed,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(SessionStatus::from_wire(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::from_wire("w-3 h-3 bg-blue-500"), None);
    }
}
