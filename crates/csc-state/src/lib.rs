//! csc-state: persisted session snapshots.
//!
//! [`AppState`] is the on-disk record, [`StateSnapshotCodec`] maps it to and from
//! the live form and session, and [`FileGateway`] is the filesystem-backed
//! [`SessionPersistenceGateway`].

pub mod codec;
pub mod export;
pub mod file_gateway;
pub mod gateway;
pub mod legacy;
pub mod naming;
pub mod schema;

pub use codec::{AppliedSnapshot, DEFAULT_RESULTS, StateSnapshotCodec};
pub use file_gateway::{FileGateway, ensure_extension, load_state, save_state};
pub use gateway::{ExportFormat, MessageDialog, SessionPersistenceGateway};
pub use naming::{default_filename, sanitize_equation};
pub use schema::AppState;

use csc_core::CalcMode;

pub type PersistResult<T> = Result<T, PersistenceError>;

#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("{format} export is only available in masses mode (current mode: {mode})")]
    Precondition { format: ExportFormat, mode: CalcMode },

    #[error("Nothing to export: the snapshot has no results")]
    MissingResults,
}
