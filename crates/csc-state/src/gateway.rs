//! Collaborators that persist snapshots and talk to the user.

use std::fmt;
use std::str::FromStr;

use csc_core::CalcMode;

use crate::schema::AppState;
use crate::{PersistResult, PersistenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Txt,
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// Tables only exist in masses mode; plain text is always available.
    pub fn allowed_in(self, mode: CalcMode) -> bool {
        match self {
            ExportFormat::Txt => true,
            ExportFormat::Csv | ExportFormat::Xlsx => mode.has_tabular(),
        }
    }

    pub fn check_allowed(self, mode: CalcMode) -> PersistResult<()> {
        if self.allowed_in(mode) {
            Ok(())
        } else {
            Err(PersistenceError::Precondition { format: self, mode })
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(PersistenceError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Storage side of save/load/export.
pub trait SessionPersistenceGateway {
    fn save_state(&self, state: &AppState) -> PersistResult<()>;

    /// `Ok(None)` means the user dismissed the file dialog.
    fn load_state(&self) -> PersistResult<Option<AppState>>;

    fn export(&self, state: &AppState, format: ExportFormat) -> PersistResult<()>;
}

/// Blocking acknowledgement dialog.
pub trait MessageDialog {
    fn show_message(&self, title: &str, message: &str, ok_label: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_need_masses_mode() {
        assert!(ExportFormat::Txt.allowed_in(CalcMode::Formula));
        assert!(!ExportFormat::Csv.allowed_in(CalcMode::Formula));
        assert!(!ExportFormat::Xlsx.allowed_in(CalcMode::Balance));
        assert!(ExportFormat::Xlsx.allowed_in(CalcMode::Masses));

        let err = ExportFormat::Csv.check_allowed(CalcMode::Formula).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Precondition {
                format: ExportFormat::Csv,
                mode: CalcMode::Formula
            }
        ));
    }

    #[test]
    fn format_parsing() {
        assert_eq!(".CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
