//! End-to-end: start the service, see the marker, open the browser once.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::time::{sleep, timeout};
use webui_tray::{
    Notifier, ProcessSupervisor, ReadinessGate, ServiceSpec, TrayAction, TrayController,
    TrayState, UrlOpener,
};

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<String>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
struct CountingOpener(Mutex<Vec<String>>);

impl CountingOpener {
    fn opened(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl UrlOpener for CountingOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn harness(
    spec: ServiceSpec,
    port: u16,
) -> (
    Arc<TrayController>,
    Arc<ProcessSupervisor>,
    ReadinessGate,
    Arc<CountingOpener>,
    Arc<RecordingNotifier>,
) {
    let gate = ReadinessGate::new();
    let supervisor = Arc::new(ProcessSupervisor::new(spec, gate.clone()));
    let opener = Arc::new(CountingOpener::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = TrayController::new(
        Arc::clone(&supervisor),
        gate.clone(),
        port,
        opener.clone(),
        notifier.clone(),
    );
    (controller, supervisor, gate, opener, notifier)
}

async fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(25)).await;
    }
    false
}

#[tokio::test]
async fn browser_opens_exactly_once_and_only_after_the_marker() {
    let spec = ServiceSpec::new(
        "sh",
        ["-c", "sleep 1; echo 'INFO: Application startup complete.' >&2; sleep 30"],
    );
    let (controller, supervisor, gate, opener, _notifier) = harness(spec, 9999);

    controller.start_service().await;
    assert_eq!(controller.state(), TrayState::Starting);

    // The marker is still a second away; nothing may have opened yet.
    assert!(opener.opened().is_empty());

    let ready = timeout(Duration::from_secs(10), gate.wait_ready())
        .await
        .expect("gate never resolved");
    assert!(ready);

    assert!(
        wait_until(Duration::from_secs(5), || opener.opened().len() == 1).await,
        "browser was not opened after readiness"
    );
    assert_eq!(opener.opened(), vec!["http://localhost:9999".to_string()]);
    assert_eq!(controller.state(), TrayState::Ready);

    // Extra readiness signals change nothing.
    gate.set_ready();
    sleep(Duration::from_millis(200)).await;
    assert_eq!(opener.opened().len(), 1);

    assert!(!controller.handle(TrayAction::Exit).await);
    assert!(!supervisor.is_running().await);
    assert_eq!(controller.state(), TrayState::Idle);
}

#[tokio::test]
async fn crash_before_readiness_surfaces_a_notification() {
    let spec = ServiceSpec::new("sh", ["-c", "echo 'booting...' >&2; exit 1"]);
    let (controller, _supervisor, _gate, opener, notifier) = harness(spec, 9999);

    controller.start_service().await;

    assert!(
        wait_until(Duration::from_secs(10), || controller.state()
            == TrayState::Crashed)
        .await,
        "controller never noticed the crash"
    );
    assert!(notifier
        .0
        .lock()
        .unwrap()
        .iter()
        .any(|m| m.contains("before it became ready")));
    assert!(opener.opened().is_empty(), "no browser launch on crash");
}

#[tokio::test]
async fn missing_executable_leaves_the_tray_idle_but_alive() {
    let spec = ServiceSpec::serve("definitely-not-a-real-binary-7f3a", 9999);
    let (controller, _supervisor, _gate, _opener, notifier) = harness(spec, 9999);

    controller.start_service().await;
    assert_eq!(controller.state(), TrayState::Idle);
    assert!(notifier
        .0
        .lock()
        .unwrap()
        .iter()
        .any(|m| m.contains("Failed to start service")));

    // The menu still works after a failed start.
    assert!(controller.handle(TrayAction::Help).await);
    assert!(!controller.handle(TrayAction::Exit).await);
}
