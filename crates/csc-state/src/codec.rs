//! Mapping between live session state and [`AppState`] snapshots.

use std::ops::RangeInclusive;
use std::str::FromStr;

use csc_core::{
    CalculationParams, CalculationResult, DEFAULT_EQUATION, DEFAULT_FLOAT_TOLERANCE,
    DEFAULT_INTIFY, DEFAULT_MAX_COMB, DEFAULT_OUTPUT_PRECISION, DEFAULT_TARGET_MASS,
    DEFAULT_TARGET_NUM, FLOAT_TOLERANCE_RANGE, OUTPUT_PRECISION_RANGE, is_valid_target_mass,
};
use csc_session::{GENERIC_FAILURE, SessionState, SessionStatus};
use tracing::warn;

use crate::legacy;
use crate::schema::AppState;

/// Results text of a snapshot with nothing to show.
pub const DEFAULT_RESULTS: &str = "Ready";

/// Everything a loaded snapshot proposes to the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedSnapshot {
    pub form: CalculationParams,
    /// Never Running; see [`AppliedSnapshot::interrupted`].
    pub session: SessionState,
    pub results: String,
    pub status_message: String,
    pub spoiler_open: bool,
    /// The snapshot was taken while a calculation was in flight. That
    /// calculation is not resumed; the session comes back idle.
    pub interrupted: bool,
}

pub struct StateSnapshotCodec;

impl StateSnapshotCodec {
    /// Build a snapshot of the form values and the current session.
    pub fn capture(session: &SessionState, form: &CalculationParams) -> AppState {
        let success = session.success();
        let status_message = session.status_message();

        let results = match success {
            Some(result) => result.details.clone(),
            None => status_message.clone(),
        };
        let tabular = match success {
            Some(result) if form.mode.has_tabular() => result.tabular.clone(),
            _ => Vec::new(),
        };

        AppState {
            equation: Some(form.equation.clone()),
            mode: Some(form.mode.to_string()),
            algorithm: Some(form.algorithm.to_string()),
            run_mode: Some(form.run_mode.to_string()),
            target_num: Some(i64::from(form.target_num)),
            target_mass: Some(form.target_mass),
            intify: Some(form.intify),
            output_precision: Some(i64::from(form.output_precision)),
            float_tolerance: Some(i64::from(form.float_tolerance)),
            max_comb: Some(i64::from(form.max_comb)),
            results: Some(results),
            tabular,
            spoiler_open: Some(false),
            status: Some(session.status().as_str().to_string()),
            status_message: Some(status_message),
        }
    }

    /// Turn a snapshot into form values and a proposed session.
    ///
    /// Fields that are missing or violate their constraint take their default.
    pub fn apply(state: &AppState) -> AppliedSnapshot {
        let form = Self::apply_form(state);

        let results = state
            .results
            .clone()
            .filter(|results| !results.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RESULTS.to_string());
        let status_message = state.status_message.clone().unwrap_or_default();
        let status = legacy::decode_status(state.status.as_deref(), &status_message, &results);
        let embedded = legacy::embedded_result(&results);

        let session = match status {
            SessionStatus::Succeeded => {
                let (details, tabular) = match embedded {
                    Some(result) => (result.details, result.tabular),
                    // Blank details are still a success.
                    None => (
                        state.results.clone().unwrap_or_default(),
                        state.tabular.clone(),
                    ),
                };
                let tabular = if form.mode.has_tabular() {
                    tabular
                } else {
                    Vec::new()
                };
                SessionState::succeeded(CalculationResult::success(details, tabular))
            }
            SessionStatus::Failed => {
                let message = legacy::error_message(&status_message)
                    .map(str::to_string)
                    .or_else(|| embedded.map(|result| result.message))
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                SessionState::failed(message)
            }
            SessionStatus::Cancelled => SessionState::cancelled(),
            SessionStatus::Idle | SessionStatus::Running => SessionState::default(),
        };

        let interrupted = status == SessionStatus::Running;
        if interrupted {
            warn!("snapshot was captured mid-calculation; loading it as idle");
        }

        let results = match session.success() {
            Some(result) => result.details.clone(),
            None if interrupted => DEFAULT_RESULTS.to_string(),
            None => results,
        };

        AppliedSnapshot {
            form,
            status_message: session.status_message(),
            session,
            results,
            spoiler_open: state.spoiler_open.unwrap_or(false),
            interrupted,
        }
    }

    /// Form half of [`StateSnapshotCodec::apply`].
    pub fn apply_form(state: &AppState) -> CalculationParams {
        CalculationParams {
            equation: state
                .equation
                .clone()
                .unwrap_or_else(|| DEFAULT_EQUATION.to_string()),
            mode: parse_or_default(state.mode.as_deref()),
            algorithm: parse_or_default(state.algorithm.as_deref()),
            run_mode: parse_or_default(state.run_mode.as_deref()),
            target_num: state
                .target_num
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_TARGET_NUM),
            target_mass: state
                .target_mass
                .filter(|mass| is_valid_target_mass(*mass))
                .unwrap_or(DEFAULT_TARGET_MASS),
            intify: state.intify.unwrap_or(DEFAULT_INTIFY),
            output_precision: in_range(state.output_precision, OUTPUT_PRECISION_RANGE)
                .unwrap_or(DEFAULT_OUTPUT_PRECISION),
            float_tolerance: in_range(state.float_tolerance, FLOAT_TOLERANCE_RANGE)
                .unwrap_or(DEFAULT_FLOAT_TOLERANCE),
            max_comb: state
                .max_comb
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n >= 1)
                .unwrap_or(DEFAULT_MAX_COMB),
        }
    }
}

fn parse_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn in_range(value: Option<i64>, range: RangeInclusive<u8>) -> Option<u8> {
    value
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| range.contains(v))
}
