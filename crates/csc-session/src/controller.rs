//! Single-flight calculation controller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use csc_core::CalculationParams;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult, TransportError};
use crate::interpret::ResultInterpreter;
use crate::port::{RawResponse, RemoteCalculationPort};
use crate::state::{Phase, SessionId, SessionState};

/// Upper bound on how long a submission may wait for the solver.
pub const DEFAULT_CALCULATION_TIMEOUT: Duration = Duration::from_secs(3000);

/// Callback invoked after every state transition.
pub type SessionObserver = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub timeout: Duration,
    /// Ask the solver to stop when the deadline expires.
    pub stop_on_timeout: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CALCULATION_TIMEOUT,
            stop_on_timeout: true,
        }
    }
}

/// What a call to [`CalculationSessionController::submit`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The submission ran and its settlement was applied.
    Completed(SessionState),
    /// A session was already running; the call became a cancel request.
    CancelRequested,
    /// The settlement arrived after a reset and was ignored.
    Discarded,
}

struct Slot {
    id: SessionId,
    abort_requested: bool,
}

struct Shared {
    state: SessionState,
    next_id: SessionId,
    active: Option<Slot>,
    observers: Vec<SessionObserver>,
}

/// Owner of the single remote calculation slot.
///
/// Cloning yields another handle to the same session; the state is only ever
/// mutated through the methods below. Phase changes happen at exactly two
/// points: `submit` (to Running) and `on_settle` (out of Running), plus the
/// unconditional `reset`/`restore`.
pub struct CalculationSessionController<P: ?Sized> {
    port: Arc<P>,
    shared: Arc<Mutex<Shared>>,
    options: SessionOptions,
}

impl<P: ?Sized> Clone for CalculationSessionController<P> {
    fn clone(&self) -> Self {
        Self {
            port: Arc::clone(&self.port),
            shared: Arc::clone(&self.shared),
            options: self.options.clone(),
        }
    }
}

impl<P> CalculationSessionController<P>
where
    P: RemoteCalculationPort + ?Sized,
{
    pub fn new(port: Arc<P>) -> Self {
        Self::with_options(port, SessionOptions::default())
    }

    pub fn with_options(port: Arc<P>, options: SessionOptions) -> Self {
        Self {
            port,
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::default(),
                next_id: 0,
                active: None,
                observers: Vec::new(),
            })),
            options,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn port(&self) -> &Arc<P> {
        &self.port
    }

    /// Register a callback that receives the state after each transition.
    pub fn subscribe(&self, observer: impl Fn(&SessionState) + Send + Sync + 'static) {
        self.lock().observers.push(Arc::new(observer));
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().state.phase
    }

    /// Start a calculation, or request cancellation if one is already running.
    ///
    /// Observers see the Running state before the solver is contacted. The
    /// future resolves once the submission settles, times out, or is superseded.
    pub async fn submit(&self, params: CalculationParams) -> SessionResult<SubmitOutcome> {
        let started = {
            let mut shared = self.lock();
            if shared.state.is_running() {
                None
            } else {
                params.validate()?;
                shared.next_id += 1;
                let id = shared.next_id;
                shared.active = Some(Slot {
                    id,
                    abort_requested: false,
                });
                shared.state = SessionState::running(id, params.clone());
                Some((id, shared.state.clone()))
            }
        };

        let Some((id, running)) = started else {
            debug!("submit while running, treating as cancel request");
            self.request_cancel().await;
            return Ok(SubmitOutcome::CancelRequested);
        };

        self.publish(&running);
        debug!(session = id, mode = %params.mode, equation = %params.equation, "calculation submitted");

        let timeout = self.options.timeout;
        let raw = match tokio::time::timeout(timeout, self.port.submit(&params)).await {
            Ok(raw) => raw,
            Err(_) => {
                warn!(session = id, ?timeout, "calculation timed out");
                if self.options.stop_on_timeout {
                    self.stop_quietly().await;
                }
                Err(TransportError::Timeout { after: timeout })
            }
        };

        Ok(match self.on_settle(id, raw) {
            Some(state) => SubmitOutcome::Completed(state),
            None => SubmitOutcome::Discarded,
        })
    }

    /// Apply the settlement of session `session_id`.
    ///
    /// Returns `None` when the session is no longer the active one (it was reset
    /// or already settled); such settlements are ignored.
    pub fn on_settle(
        &self,
        session_id: SessionId,
        raw: Result<RawResponse, TransportError>,
    ) -> Option<SessionState> {
        let settled = {
            let mut shared = self.lock();
            let aborted = match &shared.active {
                Some(slot) if slot.id == session_id => slot.abort_requested,
                _ => {
                    debug!(session = session_id, "ignoring stale settlement");
                    return None;
                }
            };
            shared.active = None;

            let outcome = ResultInterpreter::classify(raw, aborted);
            shared.state.settle(outcome);
            shared.state.clone()
        };

        info!(session = session_id, status = %settled.status(), "calculation settled");
        self.publish(&settled);
        Some(settled)
    }

    /// Flag the running session as aborted and forward a stop to the solver.
    ///
    /// The phase is left alone; the transition happens when the session settles.
    /// Returns `false` when there was nothing to cancel or cancellation was
    /// already requested.
    pub async fn request_cancel(&self) -> bool {
        let flagged = {
            let mut shared = self.lock();
            match shared.active.as_mut() {
                Some(slot) if !slot.abort_requested => {
                    slot.abort_requested = true;
                    Some(slot.id)
                }
                _ => None,
            }
        };

        let Some(id) = flagged else {
            return false;
        };

        debug!(session = id, "cancel requested");
        self.stop_quietly().await;
        true
    }

    /// Force the session back to Idle and ask the solver to stop.
    ///
    /// A settlement still in flight is ignored when it arrives.
    pub async fn reset(&self) {
        let state = {
            let mut shared = self.lock();
            shared.active = None;
            shared.state = SessionState::default();
            shared.state.clone()
        };
        debug!("session reset");
        self.publish(&state);
        self.stop_quietly().await;
    }

    /// Install a state proposed by a loaded snapshot.
    ///
    /// A proposal never resumes a calculation: Running is downgraded to Idle.
    pub fn restore(&self, mut proposal: SessionState) -> SessionResult<SessionState> {
        let state = {
            let mut shared = self.lock();
            if shared.state.is_running() {
                return Err(SessionError::Busy);
            }
            if proposal.phase == Phase::Running {
                proposal.phase = Phase::Idle;
            }
            proposal.session_id = None;
            shared.state = proposal;
            shared.state.clone()
        };
        self.publish(&state);
        Ok(state)
    }

    /// Ask the solver whether it is busy. Port failures read as not running.
    pub async fn backend_running(&self) -> bool {
        match self.port.is_running().await {
            Ok(running) => running,
            Err(err) => {
                warn!(%err, "failed to query solver status");
                false
            }
        }
    }

    async fn stop_quietly(&self) {
        if let Err(err) = self.port.stop().await {
            warn!(%err, "failed to stop calculation");
        }
    }

    fn publish(&self, state: &SessionState) {
        let observers = self.lock().observers.clone();
        for observer in observers {
            observer(state);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
