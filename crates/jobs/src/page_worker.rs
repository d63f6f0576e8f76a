use crate::backoff::retry_delay;
use autoguard_application::ports::{JobQueue, PageGenerator, PageRepository, PageStore};
use autoguard_domain::config::JobsConfig;
use autoguard_domain::{DeadLetterRecord, PageGenerationJob};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The page-generation worker.
///
/// One dispatcher loop reserves jobs under a concurrency cap and forks the
/// actual work onto its own task, so the loop keeps polling while jobs
/// render. Retries are parked in the delayed zset with exponential back-off
/// and jitter; exhausted jobs go to the dead-letter queue. In-flight jobs
/// of a crashed worker are recovered from the processing list at startup.
pub struct PageWorkerJob {
    queue: Arc<dyn JobQueue>,
    pages: Arc<dyn PageRepository>,
    generator: Arc<dyn PageGenerator>,
    store: Arc<dyn PageStore>,
    cfg: JobsConfig,
    shutdown: CancellationToken,
}

impl PageWorkerJob {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        pages: Arc<dyn PageRepository>,
        generator: Arc<dyn PageGenerator>,
        store: Arc<dyn PageStore>,
        cfg: JobsConfig,
    ) -> Self {
        Self {
            queue,
            pages,
            generator,
            store,
            cfg,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            max_concurrent = self.cfg.max_concurrent,
            max_attempts = self.cfg.max_attempts,
            "Starting page generation worker"
        );

        tokio::spawn(async move {
            match self.queue.requeue_stuck().await {
                Ok(0) => {}
                Ok(moved) => info!(moved, "Recovered in-flight jobs from previous run"),
                Err(e) => warn!(error = %e, "Could not recover in-flight jobs"),
            }

            let semaphore = Arc::new(Semaphore::new(self.cfg.max_concurrent));
            let poll_timeout = Duration::from_secs(self.cfg.poll_timeout_secs);

            loop {
                // Capacity first: never reserve a job there is no slot for.
                let permit = tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    permit = Arc::clone(&semaphore).acquire_owned() => {
                        permit.expect("worker semaphore never closed")
                    }
                };

                let reserved = tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        drop(permit);
                        break;
                    }
                    reserved = self.queue.reserve(poll_timeout) => reserved,
                };

                match reserved {
                    Ok(Some(raw)) => {
                        let worker = Arc::clone(&self);
                        tokio::spawn(async move {
                            worker.process(raw).await;
                            drop(permit);
                        });
                    }
                    Ok(None) => drop(permit),
                    Err(e) => {
                        warn!(error = %e, "Job reserve failed");
                        drop(permit);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }

            // Graceful drain: wait for in-flight jobs, bounded.
            let grace = Duration::from_secs(self.cfg.shutdown_grace_secs);
            let all = self.cfg.max_concurrent as u32;
            match tokio::time::timeout(grace, semaphore.acquire_many(all)).await {
                Ok(_) => info!("PageWorkerJob: all in-flight jobs finished"),
                Err(_) => warn!(
                    grace_secs = self.cfg.shutdown_grace_secs,
                    "PageWorkerJob: shutdown grace elapsed with jobs still in flight"
                ),
            }
            info!("PageWorkerJob: shutting down");
        });
    }

    async fn process(&self, raw: String) {
        let job: PageGenerationJob = match serde_json::from_str(&raw) {
            Ok(job) => job,
            Err(e) => {
                // A payload that cannot decode can never succeed; drop it
                // from the processing list rather than loop on it forever.
                error!(error = %e, "Undecodable job payload, acking away");
                if let Err(e) = self.queue.ack(&raw).await {
                    warn!(error = %e, "Failed to ack undecodable job");
                }
                return;
            }
        };

        info!(
            page_id = job.page_id,
            variant = job.variant.as_str(),
            action = job.action.as_str(),
            attempt = job.attempt,
            "Job started"
        );

        match self.run_job(&job).await {
            Ok(()) => {
                if let Err(e) = self.queue.ack(&raw).await {
                    warn!(error = %e, page_id = job.page_id, "Ack failed after success");
                }
                if let Err(e) = self.pages.mark_generated(job.page_id, job.variant).await {
                    warn!(error = %e, page_id = job.page_id, "Could not mark page generated");
                }
                info!(page_id = job.page_id, "Job completed");
            }
            Err(message) => self.handle_failure(&raw, &job, message).await,
        }
    }

    async fn run_job(&self, job: &PageGenerationJob) -> Result<(), String> {
        let page = self
            .generator
            .generate(job)
            .await
            .map_err(|e| e.to_string())?;
        self.store
            .write_page(&job.subdomain, job.variant, &page)
            .await
            .map_err(|e| e.to_string())
    }

    async fn handle_failure(&self, raw: &str, job: &PageGenerationJob, message: String) {
        let next_attempt = job.attempt + 1;

        if next_attempt < self.cfg.max_attempts {
            let delay = retry_delay(&self.cfg, job.attempt);
            warn!(
                page_id = job.page_id,
                attempt = job.attempt,
                delay_ms = delay.as_millis() as u64,
                error = %message,
                "Job failed, scheduling retry"
            );

            let retry = job.next_attempt();
            if let Err(e) = self.queue.schedule_retry(&retry, delay).await {
                error!(error = %e, page_id = job.page_id, "Retry scheduling failed");
            }
            if let Err(e) = self.queue.ack(raw).await {
                warn!(error = %e, page_id = job.page_id, "Ack failed after retry scheduling");
            }
            if let Err(e) = self
                .pages
                .record_attempt_error(job.page_id, job.variant, &message)
                .await
            {
                warn!(error = %e, page_id = job.page_id, "Could not record attempt error");
            }
        } else {
            error!(
                page_id = job.page_id,
                attempts = next_attempt,
                error = %message,
                "Job exhausted retries, dead-lettering"
            );

            let record = DeadLetterRecord {
                job: job.clone(),
                error: message.clone(),
                failed_at: Utc::now().to_rfc3339(),
            };
            if let Err(e) = self.queue.dead_letter(&record).await {
                error!(error = %e, page_id = job.page_id, "Dead-letter push failed");
            }
            if let Err(e) = self.queue.ack(raw).await {
                warn!(error = %e, page_id = job.page_id, "Ack failed after dead-letter");
            }
            if let Err(e) = self
                .pages
                .mark_failed(job.page_id, job.variant, &message)
                .await
            {
                warn!(error = %e, page_id = job.page_id, "Could not mark page failed");
            }
        }
    }
}
