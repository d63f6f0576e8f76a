use async_trait::async_trait;
use autoguard_domain::{DecisionLogRecord, DomainError};
use std::time::Duration;

/// The gateway-side and writer-side of the decision-log queue.
///
/// The queue is a two-list protocol (pending + processing) giving the
/// writer at-least-once delivery: a record reserved into the processing
/// list survives a writer crash and is re-queued on the next startup.
///
/// The enqueue edge is deliberately at-most-once: a failed enqueue is
/// logged and dropped so the request path never blocks on the cache.
#[async_trait]
pub trait DecisionLogQueue: Send + Sync {
    async fn enqueue(&self, record: &DecisionLogRecord) -> Result<(), DomainError>;

    /// Move up to `max` raw records into the processing list. Blocks up to
    /// `block_wait` for the first record; the remainder are taken
    /// non-blocking.
    async fn reserve_batch(
        &self,
        max: usize,
        block_wait: Duration,
    ) -> Result<Vec<String>, DomainError>;

    /// Acknowledge one raw record (remove from the processing list).
    async fn ack(&self, raw: &str) -> Result<(), DomainError>;

    /// Return one raw record from the processing list to pending.
    async fn requeue(&self, raw: &str) -> Result<(), DomainError>;

    /// Drain residual processing-list records back to pending. Called once
    /// at writer startup to recover from a crash mid-batch.
    async fn requeue_stuck(&self) -> Result<u64, DomainError>;

    async fn pending_len(&self) -> Result<u64, DomainError>;
}

/// Persistence for decision records: one transactional multi-row INSERT
/// per batch.
#[async_trait]
pub trait DecisionLogRepository: Send + Sync {
    async fn insert_batch(&self, records: &[DecisionLogRecord]) -> Result<(), DomainError>;
}
