//! Default file names for saved snapshots and exports.

use chrono::{DateTime, Local, TimeZone};

use crate::schema::AppState;

const MAX_EQUATION_CHARS: usize = 200;
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Keep ASCII letters, digits and `+ = - _`; never empty.
pub fn sanitize_equation(equation: &str) -> String {
    let sanitized: String = equation
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '=' | '-' | '_'))
        .take(MAX_EQUATION_CHARS)
        .collect();

    if sanitized.is_empty() {
        "Equation".to_string()
    } else {
        sanitized
    }
}

/// `CSC_<mode>_<equation>_<timestamp>.<ext>`, or `CSC_Untitled_<timestamp>.<ext>`.
pub fn default_filename(extension: &str, state: &AppState) -> String {
    filename_at(extension, state, &Local::now())
}

pub fn filename_at<Tz: TimeZone>(extension: &str, state: &AppState, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.format(TIMESTAMP_FORMAT);
    match state.equation.as_deref().filter(|eq| !eq.is_empty()) {
        Some(equation) => format!(
            "CSC_{}_{}_{}.{}",
            state.mode.as_deref().unwrap_or("masses"),
            sanitize_equation(equation),
            stamp,
            extension
        ),
        None => format!("CSC_Untitled_{}.{}", stamp, extension),
    }
}
