//! Process lifecycle supervisor for a tray-launched local web service:
//! spawn the child, watch its stderr for the readiness marker, open the
//! browser once it is up, stop it on exit.

pub mod browser;
pub mod cli;
pub mod constants;
pub mod controller;
pub mod error;
pub mod gate;
pub mod supervisor;
pub mod watcher;

pub use controller::{Notifier, TrayAction, TrayController, TrayState, UrlOpener};
pub use error::{SpawnError, StopError, StreamReadError};
pub use gate::ReadinessGate;
pub use supervisor::{ProcessSupervisor, ServiceSpec, StartOutcome};
pub use watcher::{drain_lines, watch_for_marker, WatchOutcome};
