// src/main.rs
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use webui_tray::browser::SystemOpener;
use webui_tray::cli::Cli;
use webui_tray::controller::{Notifier, TrayAction, TrayController};
use webui_tray::gate::ReadinessGate;
use webui_tray::supervisor::{ProcessSupervisor, ServiceSpec};

/// Notifications degrade to log lines until a platform tray shell is
/// wired in behind this trait.
struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(target: "notify", "{message}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Missing icon degrades the tray chrome, never the supervisor.
    if !cli.icon.exists() {
        tracing::warn!(
            icon = %cli.icon.display(),
            "icon file not found, tray shell will run without it"
        );
    }

    let gate = ReadinessGate::new();
    let supervisor = Arc::new(ProcessSupervisor::new(
        ServiceSpec::serve(&cli.command, cli.port),
        gate.clone(),
    ));
    let controller = TrayController::new(
        supervisor,
        gate,
        cli.port,
        Arc::new(SystemOpener),
        Arc::new(LogNotifier),
    );

    let (actions_tx, actions_rx) = mpsc::channel::<TrayAction>(16);
    ctrlc::set_handler(move || {
        let _ = actions_tx.blocking_send(TrayAction::Exit);
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(controller.run(actions_rx));

    tracing::info!("tray supervisor shut down");
    Ok(())
}
