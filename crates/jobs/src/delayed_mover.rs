use autoguard_application::ports::JobQueue;
use autoguard_domain::config::JobsConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Moves due delayed jobs back into the pending queue.
///
/// This interval job is the only mechanism that unparks retries; the move
/// itself is a server-side atomic script, so multiple processes can run a
/// mover and delayed jobs survive any restart with no in-process timer
/// state.
pub struct DelayedMoverJob {
    queue: Arc<dyn JobQueue>,
    interval: Duration,
    batch: usize,
    shutdown: CancellationToken,
}

impl DelayedMoverJob {
    pub fn new(queue: Arc<dyn JobQueue>, cfg: &JobsConfig) -> Self {
        Self {
            queue,
            interval: Duration::from_millis(cfg.mover_interval_ms),
            batch: cfg.mover_batch,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting delayed job mover"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("DelayedMoverJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.queue.move_due_delayed(self.batch).await {
                            Ok(0) => {}
                            Ok(moved) => debug!(moved, "Delayed jobs unparked"),
                            Err(e) => warn!(error = %e, "Delayed move failed"),
                        }
                    }
                }
            }
        });
    }
}
