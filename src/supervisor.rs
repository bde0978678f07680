//! Launch the web service child process, watch its stderr for the
//! readiness marker, stop it on demand.

use std::process::Stdio;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::constants::{KILL_WAIT, READY_MARKER, STOP_GRACE};
use crate::error::{SpawnError, StopError};
use crate::gate::ReadinessGate;
use crate::watcher::{self, WatchOutcome};

/// Command line the supervisor launches.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ServiceSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `<program> serve --port <port>` — the Open WebUI launch shape.
    pub fn serve(program: &str, port: u16) -> Self {
        Self::new(program, ["serve".to_string(), "--port".to_string(), port.to_string()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(u32),
    /// A live child already existed; start is an idempotent no-op.
    AlreadyRunning(u32),
}

/// Owns the child process handle. At most one live child per supervisor;
/// the mutex serializes start/stop/is_running, and `stop` holds it for
/// its full duration, so concurrent callers queue behind an in-flight
/// stop. Operations are menu-click rare, so that is acceptable.
pub struct ProcessSupervisor {
    spec: ServiceSpec,
    gate: ReadinessGate,
    child: Mutex<Option<Child>>,
    stop_grace: Duration,
    kill_wait: Duration,
}

impl ProcessSupervisor {
    pub fn new(spec: ServiceSpec, gate: ReadinessGate) -> Self {
        Self {
            spec,
            gate,
            child: Mutex::new(None),
            stop_grace: STOP_GRACE,
            kill_wait: KILL_WAIT,
        }
    }

    /// Override the stop ladder bounds. Tests use sub-second windows to
    /// exercise the SIGKILL escalation quickly.
    pub fn with_stop_bounds(mut self, stop_grace: Duration, kill_wait: Duration) -> Self {
        self.stop_grace = stop_grace;
        self.kill_wait = kill_wait;
        self
    }

    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Spawn the service with stderr piped, and hand that stream to a
    /// background watch session wired to the readiness gate. Starting
    /// while a child is already live is a logged no-op.
    pub async fn start(&self) -> Result<StartOutcome, SpawnError> {
        let mut guard = self.child.lock().await;

        if let Some(child) = guard.as_mut() {
            match child.try_wait() {
                Ok(None) => {
                    let pid = child.id().unwrap_or(0);
                    info!(pid, "service already running, start is a no-op");
                    return Ok(StartOutcome::AlreadyRunning(pid));
                }
                Ok(Some(status)) => {
                    info!(%status, "previous service process exited, replacing it");
                    *guard = None;
                }
                Err(e) => {
                    warn!("could not poll previous service process, replacing it: {e}");
                    *guard = None;
                }
            }
        }

        info!(program = %self.spec.program, args = ?self.spec.args, "starting service");
        let mut child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpawnError::Launch {
                program: self.spec.program.clone(),
                source,
            })?;

        let stderr = child.stderr.take().ok_or(SpawnError::MissingStderr)?;
        let pid = child.id().unwrap_or(0);
        *guard = Some(child);

        let gate = self.gate.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            match watcher::watch_for_marker(&mut lines, READY_MARKER).await {
                Ok(WatchOutcome::Ready) => {
                    info!(pid, "readiness marker seen");
                    gate.set_ready();
                    // Keep the pipe's read end open for the life of the
                    // child: a chatty service would die on EPIPE the
                    // moment we dropped it.
                    watcher::drain_lines(&mut lines).await;
                }
                Ok(WatchOutcome::ClosedWithoutReady) => {
                    warn!(pid, "service output closed before the readiness marker");
                    gate.abort();
                }
                Err(e) => {
                    error!(pid, "watch session failed: {e}");
                    gate.abort();
                }
            }
        });

        Ok(StartOutcome::Started(pid))
    }

    /// Stop the service: SIGTERM, bounded wait, then SIGKILL. A stop
    /// with no child running succeeds as a no-op. The handle leaves the
    /// slot up front, so even a failed stop never blocks a later start.
    pub async fn stop(&self) -> Result<(), StopError> {
        let mut guard = self.child.lock().await;
        let Some(mut child) = guard.take() else {
            info!("no service process to stop");
            return Ok(());
        };

        let Some(pid) = child.id() else {
            info!("service process already exited");
            return Ok(());
        };

        info!(pid, "stopping service");
        if let Err(source) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            if source == Errno::ESRCH {
                info!(pid, "service process already gone");
                let _ = child.try_wait();
                return Ok(());
            }
            return Err(StopError::Signal { pid, source });
        }

        match timeout(self.stop_grace, child.wait()).await {
            Ok(Ok(status)) => {
                info!(pid, %status, "service stopped");
                return Ok(());
            }
            Ok(Err(e)) => return Err(StopError::Wait(e)),
            Err(_) => {
                warn!(pid, grace = ?self.stop_grace, "service ignored SIGTERM, sending SIGKILL");
            }
        }

        child.start_kill().map_err(StopError::Wait)?;
        match timeout(self.kill_wait, child.wait()).await {
            Ok(Ok(status)) => {
                info!(pid, %status, "service killed");
                Ok(())
            }
            Ok(Err(e)) => Err(StopError::Wait(e)),
            Err(_) => Err(StopError::Timeout(self.kill_wait)),
        }
    }

    /// Lock-protected liveness snapshot. Reaps a child that exited on
    /// its own.
    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        let Some(child) = guard.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                info!(%status, "service process exited on its own");
                *guard = None;
                false
            }
            Err(e) => {
                // Same policy as start(): an unpollable handle is
                // treated as gone, never left to shadow the slot.
                warn!("could not poll service process, treating it as gone: {e}");
                *guard = None;
                false
            }
        }
    }
}
