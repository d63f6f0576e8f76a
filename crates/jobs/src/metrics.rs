use autoguard_application::ports::JobQueue;
use autoguard_domain::config::JobsConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Samples queue depths for status reporting.
pub struct QueueMetricsJob {
    queue: Arc<dyn JobQueue>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl QueueMetricsJob {
    pub fn new(queue: Arc<dyn JobQueue>, cfg: &JobsConfig) -> Self {
        Self {
            queue,
            interval: Duration::from_secs(cfg.metrics_interval_secs),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("QueueMetricsJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.queue.depths().await {
                            Ok(depths) => info!(
                                pending = depths.pending,
                                processing = depths.processing,
                                delayed = depths.delayed,
                                dead = depths.dead,
                                "Job queue depths"
                            ),
                            Err(e) => warn!(error = %e, "Queue depth sample failed"),
                        }
                    }
                }
            }
        });
    }
}
