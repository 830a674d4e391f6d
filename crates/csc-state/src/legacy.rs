//! Decoding of snapshots written by older front ends.
//!
//! Those encoded the status as a list of CSS classes (a blue dot meant "still
//! calculating") and stored the whole solver result as a JSON string in
//! `results`. Both are still accepted on load; neither is ever written.

use csc_core::CalculationResult;
use csc_session::SessionStatus;
use tracing::debug;

const LEGACY_ERROR_PREFIX: &str = "Error:";

/// Map a legacy status class list to a status by its colour.
pub fn decode_status_classes(classes: &str) -> Option<SessionStatus> {
    let classes = classes.to_ascii_lowercase();
    if classes.contains("blue") {
        Some(SessionStatus::Running)
    } else if classes.contains("red") {
        Some(SessionStatus::Failed)
    } else if classes.contains("green") {
        Some(SessionStatus::Succeeded)
    } else if classes.contains("gray") || classes.contains("grey") {
        Some(SessionStatus::Idle)
    } else {
        None
    }
}

/// A result serialized into the `results` field, if that is what it holds.
pub fn embedded_result(results: &str) -> Option<CalculationResult> {
    let trimmed = results.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// The error text carried by a status message, without its prefix.
pub fn error_message(status_message: &str) -> Option<&str> {
    status_message
        .strip_prefix(LEGACY_ERROR_PREFIX)
        .map(str::trim)
        .filter(|message| !message.is_empty())
}

/// Work out the status a snapshot was captured in.
///
/// Current snapshots name the status directly. For anything else the error
/// prefix on the message wins, then an embedded successful result, then the
/// colour of a legacy class list; a blue class list always means the snapshot
/// was taken mid-calculation.
pub fn decode_status(status: Option<&str>, status_message: &str, results: &str) -> SessionStatus {
    if let Some(status) = status.and_then(SessionStatus::from_wire) {
        return status;
    }

    let from_classes = status.and_then(decode_status_classes);
    if from_classes.is_some() {
        debug!(?from_classes, "decoded legacy status class list");
    }
    if from_classes == Some(SessionStatus::Running) {
        return SessionStatus::Running;
    }
    if status_message.starts_with(LEGACY_ERROR_PREFIX) {
        return SessionStatus::Failed;
    }
    if embedded_result(results).is_some_and(|result| result.success && !result.cancelled) {
        return SessionStatus::Succeeded;
    }
    from_classes.unwrap_or(SessionStatus::Idle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: &str = "w-3 h-3 bg-blue-500 rounded-full";
    const GRAY: &str = "w-3 h-3 bg-gray-500 rounded-full";

    #[test]
    fn current_names_are_trusted() {
        assert_eq!(
            decode_status(Some("success"), "Error: stale", "Ready"),
            SessionStatus::Succeeded
        );
    }

    #[test]
    fn blue_dot_means_calculating() {
        assert_eq!(
            decode_status(Some(BLUE), "Calculating...", "Ready"),
            SessionStatus::Running
        );
    }

    #[test]
    fn gray_dot_with_result_json_is_success() {
        let results = r#"{"success":true,"message":"","details":"2H2+O2=2H2O","cancelled":false}"#;
        assert_eq!(
            decode_status(Some(GRAY), "Ready", results),
            SessionStatus::Succeeded
        );
        assert_eq!(decode_status(Some(GRAY), "Ready", "Ready"), SessionStatus::Idle);
    }

    #[test]
    fn embedded_result_with_null_table_is_success() {
        let results =
            r#"{"success":true,"message":"","details":"H2O: 18.015","cancelled":false,"tabular":null}"#;
        let result = embedded_result(results).unwrap();
        assert_eq!(result.details, "H2O: 18.015");
        assert!(result.tabular.is_empty());
        assert_eq!(
            decode_status(Some(GRAY), "Ready", results),
            SessionStatus::Succeeded
        );
    }

    #[test]
    fn error_prefix_marks_failure() {
        assert_eq!(
            decode_status(Some(GRAY), "Error: Unknown element", "Ready"),
            SessionStatus::Failed
        );
        assert_eq!(decode_status(None, "Error: x", ""), SessionStatus::Failed);
        assert_eq!(error_message("Error: Unknown element"), Some("Unknown element"));
        assert_eq!(error_message("Error:"), None);
        assert_eq!(error_message("Ready"), None);
    }

    #[test]
    fn unknown_status_without_hints_is_idle() {
        assert_eq!(decode_status(Some("purple"), "", ""), SessionStatus::Idle);
        assert_eq!(decode_status(None, "", ""), SessionStatus::Idle);
    }

    #[test]
    fn embedded_result_needs_an_object() {
        assert!(embedded_result("2H2+O2=2H2O").is_none());
        assert!(embedded_result("{broken").is_none());
        let result = embedded_result(r#" {"success":true,"details":"x"}"#).unwrap();
        assert_eq!(result.details, "x");
    }
}
