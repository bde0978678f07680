//! Scan the service's stderr line-by-line for the readiness marker.

use tokio::io::{AsyncBufRead, Lines};
use tracing::{debug, warn};

use crate::error::StreamReadError;

/// How the marker scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The marker appeared; scanning stopped at that line.
    Ready,
    /// The stream hit EOF with no marker seen.
    ClosedWithoutReady,
}

/// Read lines until `marker` appears as a substring (case-sensitive,
/// first occurrence wins) or the stream closes.
///
/// Stops at the marker line without reading further. The caller keeps
/// the stream; a session over a live child must follow up with
/// [`drain_lines`] so the pipe's read end stays open.
///
/// One scan per process start; a read error ends the session and is
/// not retried.
pub async fn watch_for_marker<R>(
    lines: &mut Lines<R>,
    marker: &str,
) -> Result<WatchOutcome, StreamReadError>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        debug!(target: "service", "{line}");
        if line.contains(marker) {
            return Ok(WatchOutcome::Ready);
        }
    }

    Ok(WatchOutcome::ClosedWithoutReady)
}

/// Log the rest of the stream until EOF. Holding the read end open here
/// is what keeps a chatty service alive after readiness: dropping it
/// would EPIPE the child on its next stderr write. Also stops the child
/// from ever blocking on a full pipe buffer.
pub async fn drain_lines<R>(lines: &mut Lines<R>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => debug!(target: "service", "{line}"),
            Ok(None) => break,
            Err(e) => {
                warn!("error draining service output: {e}");
                break;
            }
        }
    }
}
