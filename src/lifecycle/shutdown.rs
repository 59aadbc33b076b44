//! Shutdown coordination for the daemon.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How long running tasks get to exit after shutdown is triggered.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Coordinator for graceful shutdown.
///
/// Hands one cancellation token to every long-running task.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for a task to race its blocking operations against.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait up to `grace` for `task` to finish.
    ///
    /// Returns `false` if the deadline passed first.
    pub async fn drain<F: Future>(&self, task: F, grace: Duration) -> bool {
        match tokio::time::timeout(grace, task).await {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!(grace = ?grace, "Tasks still running after shutdown grace period");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_token() {
        let shutdown = Shutdown::new();
        let first = shutdown.token();
        let second = shutdown.token();

        shutdown.trigger();

        first.cancelled().await;
        second.cancelled().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let shutdown = Shutdown::new();
        let finished = shutdown
            .drain(std::future::pending::<()>(), SHUTDOWN_GRACE)
            .await;
        assert!(!finished);

        let finished = shutdown.drain(async {}, SHUTDOWN_GRACE).await;
        assert!(finished);
    }
}
