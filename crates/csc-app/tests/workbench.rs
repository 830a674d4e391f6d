use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use csc_core::{CalcMode, CalculationParams};
use csc_session::{
    CalculationSessionController, Phase, RawResponse, RemoteCalculationPort, SessionStatus,
    SubmitOutcome, TransportError,
};
use csc_state::{
    AppState, ExportFormat, MessageDialog, PersistResult, PersistenceError,
    SessionPersistenceGateway, StateSnapshotCodec,
};
use csc_app::{EXPORT_UNAVAILABLE_TITLE, OK_LABEL, Workbench};
use serde_json::json;

struct FixedPort(RawResponse);

#[async_trait]
impl RemoteCalculationPort for FixedPort {
    async fn submit(&self, _params: &CalculationParams) -> Result<RawResponse, TransportError> {
        Ok(self.0.clone())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn is_running(&self) -> Result<bool, TransportError> {
        Ok(false)
    }
}

#[derive(Default)]
struct RecordingGateway {
    saved: Mutex<Vec<AppState>>,
    exported: Mutex<Vec<(AppState, ExportFormat)>>,
    to_load: Mutex<Option<PersistResult<Option<AppState>>>>,
}

impl SessionPersistenceGateway for RecordingGateway {
    fn save_state(&self, state: &AppState) -> PersistResult<()> {
        self.saved.lock().unwrap().push(state.clone());
        Ok(())
    }

    fn load_state(&self) -> PersistResult<Option<AppState>> {
        self.to_load.lock().unwrap().take().unwrap_or(Ok(None))
    }

    fn export(&self, state: &AppState, format: ExportFormat) -> PersistResult<()> {
        self.exported.lock().unwrap().push((state.clone(), format));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingDialog {
    shown: Mutex<Vec<(String, String, String)>>,
}

impl MessageDialog for RecordingDialog {
    fn show_message(&self, title: &str, message: &str, ok_label: &str) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string(), ok_label.to_string()));
    }
}

fn masses_reply() -> RawResponse {
    json!({
        "success": true,
        "details": "2H2+O2=2H2O",
        "tabular": [
            {"formula": "H2", "molar": 2.016, "masses": 0.126},
            {"formula": "O2", "molar": 31.998, "masses": 0.999}
        ]
    })
}

type Bench = Workbench<FixedPort, RecordingGateway, RecordingDialog>;

fn dialog_messages(bench: &Bench) -> Vec<(String, String, String)> {
    bench.dialog().shown.lock().unwrap().clone()
}

fn workbench(reply: RawResponse) -> Bench {
    let controller = CalculationSessionController::new(Arc::new(FixedPort(reply)));
    Workbench::new(controller, RecordingGateway::default(), RecordingDialog::default())
}

fn masses_form() -> CalculationParams {
    CalculationParams {
        mode: CalcMode::Masses,
        ..CalculationParams::default()
    }
}

#[tokio::test]
async fn csv_export_in_formula_mode_only_shows_a_dialog() {
    let bench = workbench(masses_reply());
    let form = CalculationParams {
        mode: CalcMode::Formula,
        ..CalculationParams::default()
    };

    assert!(!bench.export(&form, "csv"));
    assert!(bench.gateway().exported.lock().unwrap().is_empty());

    let shown = dialog_messages(&bench);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].0, EXPORT_UNAVAILABLE_TITLE);
    assert!(shown[0].1.contains("masses mode"), "{}", shown[0].1);
    assert_eq!(shown[0].2, OK_LABEL);
}

#[tokio::test]
async fn txt_export_is_allowed_in_any_mode() {
    let bench = workbench(masses_reply());
    let form = CalculationParams {
        mode: CalcMode::Balance,
        ..CalculationParams::default()
    };
    bench.run(form.clone()).await.unwrap();

    assert!(bench.export(&form, "txt"));
    let exported = bench.gateway().exported.lock().unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].1, ExportFormat::Txt);
    assert_eq!(exported[0].0.results.as_deref(), Some("2H2+O2=2H2O"));
    assert!(exported[0].0.tabular.is_empty());
}

#[tokio::test]
async fn unknown_extension_is_reported() {
    let bench = workbench(masses_reply());
    assert!(!bench.export(&masses_form(), "pdf"));
    assert!(bench.gateway().exported.lock().unwrap().is_empty());
    assert_eq!(dialog_messages(&bench).len(), 1);
}

#[tokio::test]
async fn run_then_save_captures_the_table() {
    let bench = workbench(masses_reply());
    let outcome = bench.run(masses_form()).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));

    assert!(bench.save_session(&masses_form()));
    let saved = bench.gateway().saved.lock().unwrap();
    assert_eq!(saved[0].results.as_deref(), Some("2H2+O2=2H2O"));
    assert_eq!(saved[0].status.as_deref(), Some("success"));
    assert_eq!(saved[0].tabular.len(), 2);
}

#[tokio::test]
async fn load_restores_the_session() {
    let bench = workbench(masses_reply());
    let donor = workbench(masses_reply());
    donor.run(masses_form()).await.unwrap();
    let snapshot = donor.snapshot(&masses_form());
    *bench.gateway().to_load.lock().unwrap() = Some(Ok(Some(snapshot)));

    let applied = bench.load_session().unwrap();
    assert_eq!(applied.form, masses_form());
    let state = bench.controller().state();
    assert_eq!(state.status(), SessionStatus::Succeeded);
    assert_eq!(state.success().unwrap().tabular.len(), 2);
}

#[tokio::test]
async fn mid_flight_snapshot_loads_idle() {
    let bench = workbench(masses_reply());
    let snapshot = AppState {
        equation: Some("C+O2=CO2".to_string()),
        status: Some("calculating".to_string()),
        status_message: Some("Calculating...".to_string()),
        ..AppState::default()
    };
    *bench.gateway().to_load.lock().unwrap() = Some(Ok(Some(snapshot)));

    let applied = bench.load_session().unwrap();
    assert!(applied.interrupted);
    assert_eq!(bench.controller().phase(), Phase::Idle);
    assert!(dialog_messages(&bench).is_empty());
}

#[tokio::test]
async fn dismissed_picker_and_load_failure() {
    let bench = workbench(masses_reply());
    assert!(bench.load_session().is_none());
    assert!(dialog_messages(&bench).is_empty());

    *bench.gateway().to_load.lock().unwrap() = Some(Err(PersistenceError::MissingResults));
    assert!(bench.load_session().is_none());
    assert_eq!(dialog_messages(&bench).len(), 1);
    assert_eq!(bench.controller().phase(), Phase::Idle);
}

#[tokio::test]
async fn snapshot_round_trips_the_form() {
    let bench = workbench(masses_reply());
    let form = CalculationParams {
        equation: "Fe+O2=Fe2O3".to_string(),
        output_precision: 0,
        max_comb: 20,
        ..masses_form()
    };
    let applied = StateSnapshotCodec::apply(&bench.snapshot(&form));
    assert_eq!(applied.form, form);
}
