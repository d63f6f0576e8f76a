use async_trait::async_trait;
use autoguard_domain::{DeadLetterRecord, DomainError, PageGenerationJob, Variant};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueDepths {
    pub pending: u64,
    pub processing: u64,
    pub delayed: u64,
    pub dead: u64,
}

/// The durable page-generation queue: pending list, processing list,
/// delayed sorted-set and dead-letter list.
///
/// Raw payloads travel as JSON strings so that ack (`LREM` by value) can
/// address the exact bytes that were reserved.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &PageGenerationJob) -> Result<(), DomainError>;

    /// Blocking-pop one raw job into the processing list, waiting up to
    /// `timeout`. `None` on timeout.
    async fn reserve(&self, timeout: Duration) -> Result<Option<String>, DomainError>;

    /// Remove one raw payload from the processing list.
    async fn ack(&self, raw: &str) -> Result<(), DomainError>;

    /// Park a retry in the delayed set, unlocking after `delay`.
    /// Implementations fall back to an immediate re-queue when the delayed
    /// set is unavailable — at-least-once is preserved at the cost of
    /// ordering.
    async fn schedule_retry(
        &self,
        job: &PageGenerationJob,
        delay: Duration,
    ) -> Result<(), DomainError>;

    async fn dead_letter(&self, record: &DeadLetterRecord) -> Result<(), DomainError>;

    /// Move due delayed jobs back to pending, at most `max` per call.
    /// Atomic server-side: concurrent movers never duplicate a job.
    async fn move_due_delayed(&self, max: usize) -> Result<u64, DomainError>;

    /// Drain residual processing-list jobs back to pending. Called once at
    /// worker startup to recover crashed in-flight jobs.
    async fn requeue_stuck(&self) -> Result<u64, DomainError>;

    async fn depths(&self) -> Result<QueueDepths, DomainError>;
}

/// Status mutations on the page row owned by a generation job.
#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn mark_generating(&self, page_id: i64, variant: Variant) -> Result<(), DomainError>;

    async fn mark_generated(&self, page_id: i64, variant: Variant) -> Result<(), DomainError>;

    /// Keep the row in `generating` but record the error of a failed
    /// attempt that will be retried.
    async fn record_attempt_error(
        &self,
        page_id: i64,
        variant: Variant,
        error: &str,
    ) -> Result<(), DomainError>;

    async fn mark_failed(
        &self,
        page_id: i64,
        variant: Variant,
        error: &str,
    ) -> Result<(), DomainError>;
}
