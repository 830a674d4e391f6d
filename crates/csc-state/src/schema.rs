//! Snapshot record definition.

use csc_core::TabularRow;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Persistable snapshot of the form, the last results, and the status line.
///
/// Every scalar is optional on the way in: a field that is absent, null, or of
/// the wrong type reads as `None` instead of failing the whole load, and the
/// codec substitutes the documented default. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default, deserialize_with = "lenient")]
    pub equation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub algorithm: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub run_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_num: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_mass: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub intify: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub output_precision: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub float_tolerance: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_comb: Option<i64>,
    /// Human summary, or a serialized result in snapshots from older versions.
    #[serde(default, deserialize_with = "lenient")]
    pub results: Option<String>,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub tabular: Vec<TabularRow>,
    #[serde(default, deserialize_with = "lenient")]
    pub spoiler_open: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status_message: Option<String>,
}

impl AppState {
    /// Fill blank enum, results and status fields before the record is written.
    pub fn fill_save_defaults(&mut self) {
        fill_blank(&mut self.mode, "masses");
        fill_blank(&mut self.algorithm, "auto");
        fill_blank(&mut self.run_mode, "balance");
        fill_blank(&mut self.results, crate::codec::DEFAULT_RESULTS);
        if is_blank(&self.status) {
            self.status = Some(csc_session::SessionStatus::Idle.as_str().to_string());
            self.status_message = Some("Ready".to_string());
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn from_yaml(text: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(text)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn fill_blank(field: &mut Option<String>, default: &str) {
    if is_blank(field) {
        *field = Some(default.to_string());
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_rows<'de, D>(deserializer: D) -> Result<Vec<TabularRow>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}
