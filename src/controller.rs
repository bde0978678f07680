//! Interpret tray menu actions into supervisor calls and readiness-aware
//! browser launches. The platform tray shell itself stays behind the
//! `Notifier` and `UrlOpener` seams.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::constants::local_url;
use crate::gate::ReadinessGate;
use crate::supervisor::ProcessSupervisor;

/// Fixed set of tray menu actions, dispatched through one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    OpenWebsite,
    Help,
    Exit,
}

/// User-visible messages, surfaced by the platform tray shell.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Opens a URL with the OS default handler.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayState {
    Idle,
    Starting,
    Ready,
    Stopping,
    Crashed,
}

pub struct TrayController {
    supervisor: Arc<ProcessSupervisor>,
    gate: ReadinessGate,
    port: u16,
    opener: Arc<dyn UrlOpener>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<TrayState>,
    quitting: AtomicBool,
}

impl TrayController {
    pub fn new(
        supervisor: Arc<ProcessSupervisor>,
        gate: ReadinessGate,
        port: u16,
        opener: Arc<dyn UrlOpener>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            supervisor,
            gate,
            port,
            opener,
            notifier,
            state: Mutex::new(TrayState::Idle),
            quitting: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> TrayState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: TrayState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Start the service and arm a waiter that opens the browser exactly
    /// once when the readiness marker arrives. A spawn failure leaves the
    /// tray in `Idle` with a notification; the menu keeps working.
    pub async fn start_service(self: &Arc<Self>) {
        self.set_state(TrayState::Starting);
        if let Err(e) = self.supervisor.start().await {
            error!("failed to start service: {e}");
            self.notifier.notify(&format!("Failed to start service: {e}"));
            self.set_state(TrayState::Idle);
            return;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            if this.gate.wait_ready().await {
                this.set_state(TrayState::Ready);
                this.notifier.notify("Service is up");
                this.open_website();
            } else if !this.quitting.load(Ordering::SeqCst) {
                this.set_state(TrayState::Crashed);
                this.notifier
                    .notify("Service exited before it became ready");
            }
        });
    }

    /// Dispatch one menu action. Returns `false` when the run loop
    /// should terminate.
    pub async fn handle(&self, action: TrayAction) -> bool {
        match action {
            // Deliberately not gated on readiness: clicking early just
            // shows the browser's connection error, as the service's
            // own tray app always behaved.
            TrayAction::OpenWebsite => {
                self.open_website();
                true
            }
            TrayAction::Help => {
                let url = local_url(self.port);
                self.notifier.notify(&format!(
                    "Service runs on port {}.\nOpen {} to use it.",
                    self.port, url
                ));
                true
            }
            TrayAction::Exit => {
                self.quitting.store(true, Ordering::SeqCst);
                self.set_state(TrayState::Stopping);
                if let Err(e) = self.supervisor.stop().await {
                    warn!("stop failed, treating service as gone: {e}");
                }
                self.notifier.notify("Service stopped");
                self.set_state(TrayState::Idle);
                false
            }
        }
    }

    fn open_website(&self) {
        let url = local_url(self.port);
        info!(%url, "opening browser");
        if let Err(e) = self.opener.open(&url) {
            error!("failed to open {url}: {e}");
        }
    }

    /// Run loop: start the service, then serve menu actions until Exit
    /// (or the action channel closes).
    pub async fn run(self: Arc<Self>, mut actions: mpsc::Receiver<TrayAction>) {
        self.start_service().await;
        while let Some(action) = actions.recv().await {
            if !self.handle(action).await {
                break;
            }
        }
    }
}
