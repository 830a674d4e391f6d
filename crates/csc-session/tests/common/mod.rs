//! Scripted solver port shared by the controller tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use csc_core::CalculationParams;
use csc_session::{RawResponse, RemoteCalculationPort, TransportError};
use serde_json::json;
use tokio::sync::{Notify, oneshot};

type Reply = Result<RawResponse, TransportError>;

/// Port whose submissions stay pending until the test resolves them.
#[derive(Default)]
pub struct ScriptedPort {
    submits: AtomicUsize,
    stops: AtomicUsize,
    pending: Mutex<VecDeque<oneshot::Sender<Reply>>>,
    submitted: Notify,
    cancel_on_stop: AtomicBool,
    fail_status: AtomicBool,
    params: Mutex<Vec<CalculationParams>>,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mimic a solver that answers a stop with a cancelled result.
    pub fn cancelling() -> Self {
        let port = Self::default();
        port.cancel_on_stop.store(true, Ordering::SeqCst);
        port
    }

    pub fn failing_status() -> Self {
        let port = Self::default();
        port.fail_status.store(true, Ordering::SeqCst);
        port
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn submitted_params(&self) -> Vec<CalculationParams> {
        self.params.lock().unwrap().clone()
    }

    pub async fn wait_for_submit(&self) {
        self.submitted.notified().await;
    }

    /// Resolve the oldest pending submission.
    pub fn resolve(&self, reply: Reply) {
        let sender = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("no pending submission");
        let _ = sender.send(reply);
    }
}

#[async_trait]
impl RemoteCalculationPort for ScriptedPort {
    async fn submit(&self, params: &CalculationParams) -> Reply {
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.params.lock().unwrap().push(params.clone());
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(tx);
        self.submitted.notify_one();
        rx.await.unwrap_or(Err(TransportError::ChannelClosed))
    }

    async fn stop(&self) -> Result<(), TransportError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.cancel_on_stop.load(Ordering::SeqCst) {
            let sender = self.pending.lock().unwrap().pop_front();
            if let Some(sender) = sender {
                let _ = sender.send(Ok(json!({"success": false, "cancelled": true})));
            }
        }
        Ok(())
    }

    async fn is_running(&self) -> Result<bool, TransportError> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(TransportError::ChannelClosed);
        }
        Ok(!self.pending.lock().unwrap().is_empty())
    }
}

pub fn masses_reply() -> RawResponse {
    json!({
        "success": true,
        "message": "",
        "details": "2H2+O2=2H2O",
        "cancelled": false,
        "tabular": [
            {"formula": "H2", "molar": 2.016, "masses": 0.126},
            {"formula": "O2", "molar": 31.998, "masses": 1.0},
            {"formula": "H2O", "molar": 18.015, "masses": 1.126}
        ]
    })
}
