//! Filesystem-backed persistence gateway.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use csc_core::CalcMode;
use tracing::info;

use crate::export;
use crate::gateway::{ExportFormat, SessionPersistenceGateway};
use crate::naming::default_filename;
use crate::schema::AppState;
use crate::PersistResult;

pub fn load_state(path: &Path) -> PersistResult<AppState> {
    let content = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let state = if is_yaml {
        AppState::from_yaml(&content)?
    } else {
        AppState::from_json(&content)?
    };
    Ok(state)
}

/// Write a snapshot as pretty JSON after filling blank fields.
pub fn save_state(path: &Path, state: &AppState) -> PersistResult<()> {
    let mut state = state.clone();
    state.fill_save_defaults();
    std::fs::write(path, state.to_json_pretty()?)?;
    Ok(())
}

pub fn export_state(path: &Path, state: &AppState, format: ExportFormat) -> PersistResult<()> {
    match format {
        ExportFormat::Txt => std::fs::write(path, export::text_report(state)?)?,
        ExportFormat::Csv => std::fs::write(path, export::csv_table(&export::table_rows(state)))?,
        ExportFormat::Xlsx => export::write_xlsx(&export::table_rows(state), path)?,
    }
    Ok(())
}

/// Append `.ext` unless the path already ends with it.
pub fn ensure_extension(path: &Path, extension: &str) -> PathBuf {
    let has_it = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if has_it {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Gateway over a fixed location.
///
/// `target` is either a file, or a directory in which a default file name is
/// generated on every save and export. Loading always reads `target` itself.
#[derive(Debug, Clone)]
pub struct FileGateway {
    target: PathBuf,
}

impl FileGateway {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    fn resolve(&self, extension: &str, state: &AppState) -> PathBuf {
        if self.target.is_dir() {
            self.target.join(default_filename(extension, state))
        } else {
            ensure_extension(&self.target, extension)
        }
    }

    /// Save and report where the snapshot went.
    pub fn save_to(&self, state: &AppState) -> PersistResult<PathBuf> {
        let path = self.resolve("json", state);
        save_state(&path, state)?;
        info!(path = %path.display(), "session saved");
        Ok(path)
    }

    /// Export and report where the file went.
    pub fn export_to(&self, state: &AppState, format: ExportFormat) -> PersistResult<PathBuf> {
        let mode = state
            .mode
            .as_deref()
            .and_then(|mode| mode.parse::<CalcMode>().ok())
            .unwrap_or_default();
        format.check_allowed(mode)?;

        let path = self.resolve(format.extension(), state);
        export_state(&path, state, format)?;
        info!(path = %path.display(), %format, "results exported");
        Ok(path)
    }
}

impl SessionPersistenceGateway for FileGateway {
    fn save_state(&self, state: &AppState) -> PersistResult<()> {
        self.save_to(state).map(|_| ())
    }

    fn load_state(&self) -> PersistResult<Option<AppState>> {
        let state = load_state(&self.target)?;
        info!(path = %self.target.display(), "session loaded");
        Ok(Some(state))
    }

    fn export(&self, state: &AppState, format: ExportFormat) -> PersistResult<()> {
        self.export_to(state, format).map(|_| ())
    }
}
