use autoguard_application::ports::{DecisionLogQueue, DecisionLogRepository};
use autoguard_domain::config::LogQueueConfig;
use autoguard_domain::DecisionLogRecord;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Single writer draining the decision-log queue into the primary store.
///
/// Each cycle reserves up to a batch of raw records into the processing
/// list, commits them in one transaction, then acknowledges per item.
/// A failed commit returns every reserved record to the pending list and
/// backs off, so delivery is at-least-once. Residual in-flight records
/// from a crashed writer are re-queued once at startup.
pub struct LogWriterJob {
    queue: Arc<dyn DecisionLogQueue>,
    repository: Arc<dyn DecisionLogRepository>,
    batch_size: usize,
    block_wait: Duration,
    failure_backoff: Duration,
    counter_interval: Duration,
    shutdown: CancellationToken,
}

impl LogWriterJob {
    pub fn new(
        queue: Arc<dyn DecisionLogQueue>,
        repository: Arc<dyn DecisionLogRepository>,
        cfg: &LogQueueConfig,
    ) -> Self {
        Self {
            queue,
            repository,
            batch_size: cfg.batch_size,
            block_wait: Duration::from_secs(cfg.block_wait_secs),
            failure_backoff: Duration::from_secs(cfg.failure_backoff_secs),
            counter_interval: Duration::from_secs(cfg.counter_interval_secs),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            batch_size = self.batch_size,
            block_wait_secs = self.block_wait.as_secs(),
            "Starting decision log writer"
        );

        tokio::spawn(async move {
            match self.queue.requeue_stuck().await {
                Ok(0) => {}
                Ok(moved) => info!(moved, "Recovered in-flight log records from previous run"),
                Err(e) => warn!(error = %e, "Could not recover in-flight log records"),
            }

            let mut persisted: u64 = 0;
            let mut dropped: u64 = 0;
            let mut failed_batches: u64 = 0;
            let mut last_report = Instant::now();

            loop {
                let batch = tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!(persisted, "LogWriterJob: shutting down");
                        break;
                    }
                    batch = self.queue.reserve_batch(self.batch_size, self.block_wait) => batch,
                };

                match batch {
                    Ok(raws) if raws.is_empty() => {}
                    Ok(raws) => {
                        let outcome = self.flush(&raws).await;
                        persisted += outcome.persisted;
                        dropped += outcome.dropped;
                        if outcome.insert_failed {
                            failed_batches += 1;
                            tokio::time::sleep(self.failure_backoff).await;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Log queue reserve failed");
                        tokio::time::sleep(self.failure_backoff).await;
                    }
                }

                if last_report.elapsed() >= self.counter_interval {
                    info!(persisted, dropped, failed_batches, "Log writer counters");
                    last_report = Instant::now();
                }
            }
        });
    }

    /// On insert failure every decodable record is re-queued.
    async fn flush(&self, raws: &[String]) -> FlushOutcome {
        let mut records: Vec<DecisionLogRecord> = Vec::with_capacity(raws.len());
        let mut undecodable: Vec<&String> = Vec::new();
        let mut decodable: Vec<&String> = Vec::new();

        for raw in raws {
            match serde_json::from_str::<DecisionLogRecord>(raw) {
                Ok(record) => {
                    records.push(record);
                    decodable.push(raw);
                }
                Err(e) => {
                    warn!(error = %e, "Undecodable log record dropped");
                    undecodable.push(raw);
                }
            }
        }

        // Undecodable records can never succeed; ack them away regardless
        // of how the insert goes.
        for raw in &undecodable {
            if let Err(e) = self.queue.ack(raw).await {
                warn!(error = %e, "Failed to ack undecodable record");
            }
        }

        if records.is_empty() {
            return FlushOutcome {
                persisted: 0,
                dropped: undecodable.len() as u64,
                insert_failed: false,
            };
        }

        match self.repository.insert_batch(&records).await {
            Ok(()) => {
                for raw in &decodable {
                    if let Err(e) = self.queue.ack(raw).await {
                        warn!(error = %e, "Ack failed after successful insert");
                    }
                }
                debug!(count = records.len(), "Log batch persisted");
                FlushOutcome {
                    persisted: records.len() as u64,
                    dropped: undecodable.len() as u64,
                    insert_failed: false,
                }
            }
            Err(e) => {
                error!(error = %e, count = records.len(), "Log batch insert failed, re-queueing");
                for raw in &decodable {
                    if let Err(e) = self.queue.requeue(raw).await {
                        error!(error = %e, "Re-queue failed, record stays in processing list");
                    }
                }
                FlushOutcome {
                    persisted: 0,
                    dropped: undecodable.len() as u64,
                    insert_failed: true,
                }
            }
        }
    }
}

struct FlushOutcome {
    persisted: u64,
    dropped: u64,
    insert_failed: bool,
}
