//! One-shot readiness signal shared between the supervisor and its waiters.

use tokio_util::sync::CancellationToken;

/// Cloneable readiness flag with a blocking (non-polling) wait.
///
/// `ready` is monotonic: once set it stays set for the life of the gate.
/// The `aborted` side covers the service dying before it ever became
/// ready, so waiters are never stranded.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: CancellationToken,
    aborted: CancellationToken,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service ready. Idempotent; wakes every current and
    /// future waiter exactly once each.
    pub fn set_ready(&self) {
        self.ready.cancel();
    }

    /// Give up on readiness (service exited or its output stream died
    /// before the marker appeared). Idempotent.
    pub fn abort(&self) {
        self.aborted.cancel();
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_cancelled()
    }

    /// Suspend until the gate resolves. Returns `true` once ready,
    /// `false` if the wait was aborted first. Readiness wins when both
    /// sides have fired.
    pub async fn wait_ready(&self) -> bool {
        tokio::select! {
            biased;
            () = self.ready.cancelled() => true,
            () = self.aborted.cancelled() => false,
        }
    }
}
