//! Run, save, load and export orchestration for a front end.
//!
//! Persistence failures never escape: they are shown through the dialog and the
//! session is left untouched.

use csc_core::CalculationParams;
use csc_session::{CalculationSessionController, RemoteCalculationPort, SubmitOutcome};
use csc_state::{
    AppState, AppliedSnapshot, ExportFormat, MessageDialog, SessionPersistenceGateway,
    StateSnapshotCodec,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

pub const EXPORT_UNAVAILABLE_TITLE: &str = "Export Unavailable";
pub const OK_LABEL: &str = "OK";

const SAVE_FAILED_TITLE: &str = "Save Failed";
const LOAD_FAILED_TITLE: &str = "Load Failed";
const EXPORT_FAILED_TITLE: &str = "Export Failed";

pub struct Workbench<P: ?Sized, G, D> {
    controller: CalculationSessionController<P>,
    gateway: G,
    dialog: D,
}

impl<P, G, D> Workbench<P, G, D>
where
    P: RemoteCalculationPort + ?Sized,
    G: SessionPersistenceGateway,
    D: MessageDialog,
{
    pub fn new(controller: CalculationSessionController<P>, gateway: G, dialog: D) -> Self {
        Self {
            controller,
            gateway,
            dialog,
        }
    }

    pub fn controller(&self) -> &CalculationSessionController<P> {
        &self.controller
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    /// Start the calculation described by the form, or cancel the running one.
    pub async fn run(&self, form: CalculationParams) -> AppResult<SubmitOutcome> {
        Ok(self.controller.submit(form).await?)
    }

    pub fn snapshot(&self, form: &CalculationParams) -> AppState {
        StateSnapshotCodec::capture(&self.controller.state(), form)
    }

    /// Returns whether the snapshot was written.
    pub fn save_session(&self, form: &CalculationParams) -> bool {
        let state = self.snapshot(form);
        match self.gateway.save_state(&state) {
            Ok(()) => true,
            Err(err) => {
                self.report(SAVE_FAILED_TITLE, &AppError::from(err));
                false
            }
        }
    }

    /// Load a snapshot and install its session.
    ///
    /// `None` when the user dismissed the picker or the load failed; failures
    /// are reported through the dialog.
    pub fn load_session(&self) -> Option<AppliedSnapshot> {
        match self.try_load() {
            Ok(applied) => applied,
            Err(err) => {
                self.report(LOAD_FAILED_TITLE, &err);
                None
            }
        }
    }

    fn try_load(&self) -> AppResult<Option<AppliedSnapshot>> {
        let Some(state) = self.gateway.load_state()? else {
            return Ok(None);
        };
        let applied = StateSnapshotCodec::apply(&state);
        self.controller.restore(applied.session.clone())?;
        if applied.interrupted {
            info!("loaded snapshot was taken mid-calculation; it was not resumed");
        }
        Ok(Some(applied))
    }

    /// Export the current results as `extension` (`txt`, `csv` or `xlsx`).
    ///
    /// Table formats outside masses mode are refused here with a dialog and
    /// never reach the gateway.
    pub fn export(&self, form: &CalculationParams, extension: &str) -> bool {
        let format = match extension.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(err) => {
                self.report(EXPORT_UNAVAILABLE_TITLE, &AppError::from(err));
                return false;
            }
        };
        if let Err(err) = format.check_allowed(form.mode) {
            self.report(EXPORT_UNAVAILABLE_TITLE, &AppError::from(err));
            return false;
        }

        let state = self.snapshot(form);
        match self.gateway.export(&state, format) {
            Ok(()) => true,
            Err(err) => {
                self.report(EXPORT_FAILED_TITLE, &AppError::from(err));
                false
            }
        }
    }

    fn report(&self, title: &str, err: &AppError) {
        warn!(%err, title, "reporting failure to user");
        let message = match err {
            AppError::Persistence(inner) => inner.to_string(),
            other => other.to_string(),
        };
        self.dialog.show_message(title, &message, OK_LABEL);
    }
}
