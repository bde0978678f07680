//! Service defaults and timing bounds.

use std::time::Duration;

/// Line the service prints on stderr once it is accepting requests.
pub const READY_MARKER: &str = "Application startup complete.";

/// Executable launched as `<command> serve --port <port>`.
pub const DEFAULT_COMMAND: &str = "open-webui";

pub const DEFAULT_PORT: u16 = 9999;

// Stop ladder: SIGTERM, bounded wait, SIGKILL, short follow-up wait.
pub const STOP_GRACE: Duration = Duration::from_secs(10);
pub const KILL_WAIT: Duration = Duration::from_secs(2);

/// URL served by the child on localhost.
pub fn local_url(port: u16) -> String {
    format!("http://localhost:{port}")
}
