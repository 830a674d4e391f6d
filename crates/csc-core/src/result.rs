//! Solver result data types.

use serde::{Deserialize, Deserializer, Serialize};

/// One line of the masses-mode table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularRow {
    pub formula: String,
    pub molar: f64,
    pub masses: f64,
}

/// Result object returned by the solver.
///
/// `success` and `cancelled` are mutually exclusive; when `cancelled` is set the
/// other fields carry no meaning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationResult {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancelled: bool,
    /// The solver sends `null` outside masses mode.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tabular: Vec<TabularRow>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CalculationResult {
    pub fn success(details: impl Into<String>, tabular: Vec<TabularRow>) -> Self {
        Self {
            success: true,
            details: details.into(),
            tabular,
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fields_read_as_empty() {
        let result: CalculationResult = serde_json::from_str(
            r#"{"success":true,"message":"","details":"H2O: 18.015","cancelled":false,"tabular":null}"#,
        )
        .unwrap();
        assert!(result.success);
        assert_eq!(result.details, "H2O: 18.015");
        assert!(result.tabular.is_empty());

        let zero: CalculationResult = serde_json::from_str(
            r#"{"success":false,"message":null,"details":null,"cancelled":false,"tabular":null}"#,
        )
        .unwrap();
        assert_eq!(zero, CalculationResult::default());
    }

    #[test]
    fn missing_optional_fields_default() {
        let result: CalculationResult = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(result.success);
        assert!(result.tabular.is_empty());
        assert!(!result.cancelled);
    }

    #[test]
    fn missing_success_is_rejected() {
        assert!(serde_json::from_str::<CalculationResult>(r#"{"details":"x"}"#).is_err());
    }

    #[test]
    fn empty_tabular_is_omitted() {
        let json = serde_json::to_value(CalculationResult::failure("bad")).unwrap();
        assert!(json.get("tabular").is_none());
        assert_eq!(json["message"], "bad");
    }
}
