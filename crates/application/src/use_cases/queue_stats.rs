use crate::ports::{DecisionLogQueue, JobQueue, QueueDepths};
use autoguard_domain::DomainError;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueStats {
    pub jobs: QueueDepths,
    pub log_pending: u64,
}

/// Snapshot the queue depths for status reporting.
pub struct GetQueueStatsUseCase {
    jobs: Arc<dyn JobQueue>,
    logs: Arc<dyn DecisionLogQueue>,
}

impl GetQueueStatsUseCase {
    pub fn new(jobs: Arc<dyn JobQueue>, logs: Arc<dyn DecisionLogQueue>) -> Self {
        Self { jobs, logs }
    }

    pub async fn execute(&self) -> Result<QueueStats, DomainError> {
        Ok(QueueStats {
            jobs: self.jobs.depths().await?,
            log_pending: self.logs.pending_len().await?,
        })
    }
}
