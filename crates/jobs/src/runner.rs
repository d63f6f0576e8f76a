use crate::{DelayedMoverJob, LogWriterJob, PageWorkerJob, QueueMetricsJob};
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for all background jobs.
///
/// Use the builder pattern to register jobs, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// JobRunner::new()
///     .with_log_writer(LogWriterJob::new(queue, repo, &cfg.log_queue))
///     .with_page_worker(PageWorkerJob::new(jobs, pages, generator, store, cfg.jobs.clone()))
///     .start()
///     .await;
/// ```
pub struct JobRunner {
    log_writer: Option<LogWriterJob>,
    page_worker: Option<PageWorkerJob>,
    delayed_mover: Option<DelayedMoverJob>,
    metrics: Option<QueueMetricsJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            log_writer: None,
            page_worker: None,
            delayed_mover: None,
            metrics: None,
        }
    }

    pub fn with_log_writer(mut self, job: LogWriterJob) -> Self {
        self.log_writer = Some(job);
        self
    }

    pub fn with_page_worker(mut self, job: PageWorkerJob) -> Self {
        self.page_worker = Some(job);
        self
    }

    pub fn with_delayed_mover(mut self, job: DelayedMoverJob) -> Self {
        self.delayed_mover = Some(job);
        self
    }

    pub fn with_metrics(mut self, job: QueueMetricsJob) -> Self {
        self.metrics = Some(job);
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.log_writer {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.page_worker {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.delayed_mover {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.metrics {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
