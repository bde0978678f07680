//! Failure taxonomy for the supervisor core.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// The service executable could not be launched.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The spawned child carried no captured stderr handle.
    #[error("service process has no captured stderr")]
    MissingStderr,
}

/// Termination signaling or the wait for exit failed.
///
/// Whichever variant comes back, the supervisor has already cleared its
/// process handle: a failed stop never locks out a future start.
#[derive(Debug, Error)]
pub enum StopError {
    #[error("failed to signal service process (pid {pid}): {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::Error,
    },

    #[error("error while waiting for service process to exit: {0}")]
    Wait(#[source] io::Error),

    #[error("service process still alive {0:?} after SIGKILL")]
    Timeout(Duration),
}

/// Reading the watched stream failed; the watch session is over.
#[derive(Debug, Error)]
#[error("error reading service output: {0}")]
pub struct StreamReadError(#[from] pub io::Error);
