//! Solver executable driven over stdin/stdout.
//!
//! Each submission spawns the configured program, writes the parameters as a
//! single JSON line to its stdin, closes stdin, and parses whatever the program
//! prints to stdout as the result object.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use csc_core::CalculationParams;
use csc_session::{RawResponse, RemoteCalculationPort, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProcessPortConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ProcessPortConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

struct Running {
    id: u64,
    child: Child,
}

/// One child process at a time; `stop` kills it.
pub struct ProcessPort {
    config: ProcessPortConfig,
    running: Mutex<Option<Running>>,
    next_id: AtomicU64,
}

impl ProcessPort {
    pub fn new(config: ProcessPortConfig) -> Self {
        Self {
            config,
            running: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ProcessPortConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove the child of submission `id` from the slot, if it is still there.
    fn release(&self, id: u64) -> Option<Child> {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(running) if running.id == id => slot.take().map(|running| running.child),
            _ => None,
        }
    }
}

/// Frees the slot when a submission future is dropped before it finishes,
/// e.g. by a timeout. Dropping the child kills it.
struct SlotGuard<'a> {
    port: &'a ProcessPort,
    id: u64,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if self.port.release(self.id).is_some() {
            debug!(submission = self.id, "abandoned solver killed");
        }
    }
}

#[async_trait]
impl RemoteCalculationPort for ProcessPort {
    async fn submit(&self, params: &CalculationParams) -> Result<RawResponse, TransportError> {
        let mut line = serde_json::to_string(params).map_err(|err| TransportError::Backend {
            message: err.to_string(),
        })?;
        line.push('\n');

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(TransportError::ChannelClosed);
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut slot = self.lock();
            if let Some(previous) = slot.as_mut() {
                // An exited child no longer holds the slot.
                if previous.child.try_wait()?.is_none() {
                    return Err(TransportError::Backend {
                        message: "solver is already running".to_string(),
                    });
                }
            }
            *slot = Some(Running { id, child });
        }
        let guard = SlotGuard { port: self, id };
        debug!(program = %self.config.program.display(), submission = id, "solver spawned");

        // A solver that exits without reading its input is judged by its output.
        if let Err(err) = stdin.write_all(line.as_bytes()).await {
            debug!(%err, "failed to write parameters to solver");
        }
        drop(stdin);

        let mut out = Vec::new();
        let mut err_out = Vec::new();
        let read = tokio::try_join!(
            stdout.read_to_end(&mut out),
            stderr.read_to_end(&mut err_out)
        );

        let finished = self.release(id);
        drop(guard);
        let status = match finished {
            Some(mut child) => Some(child.wait().await?),
            None => None,
        };
        read?;
        debug!(?status, bytes = out.len(), "solver finished");

        parse_output(&out, &err_out, status)
    }

    async fn stop(&self) -> Result<(), TransportError> {
        if let Some(running) = self.lock().as_mut() {
            debug!(submission = running.id, "killing solver");
            running.child.start_kill()?;
        }
        Ok(())
    }

    async fn is_running(&self) -> Result<bool, TransportError> {
        match self.lock().as_mut() {
            Some(running) => Ok(running.child.try_wait()?.is_none()),
            None => Ok(false),
        }
    }
}

fn parse_output(
    stdout: &[u8],
    stderr: &[u8],
    status: Option<ExitStatus>,
) -> Result<RawResponse, TransportError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();

    if text.is_empty() {
        let detail = String::from_utf8_lossy(stderr).trim().to_string();
        return Err(match status {
            Some(status) if !status.success() => TransportError::Backend {
                message: if detail.is_empty() {
                    format!("solver exited with {status}")
                } else {
                    detail
                },
            },
            _ => TransportError::ChannelClosed,
        });
    }

    // Progress chatter may precede the result; the last line then holds it.
    serde_json::from_str(text)
        .or_else(|err| match text.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(last) if last.len() < text.len() => serde_json::from_str(last.trim()),
            _ => Err(err),
        })
        .map_err(|err| TransportError::Malformed {
            message: err.to_string(),
        })
}
