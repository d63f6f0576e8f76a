use crate::ports::{JobQueue, PageRepository};
use autoguard_domain::{DomainError, PageGenerationJob};
use std::sync::Arc;
use tracing::info;

/// Enqueue a page-generation job and flip the page row to `generating`.
///
/// Job identity is `(page_id, variant)`. Re-enqueueing while an earlier
/// attempt is still in flight is allowed: both may complete and the last
/// writer wins. Refusing while `generating`, or fencing stale writes with a
/// generation id, is a product decision that has deliberately not been
/// taken.
pub struct EnqueuePageJobUseCase {
    queue: Arc<dyn JobQueue>,
    pages: Arc<dyn PageRepository>,
}

impl EnqueuePageJobUseCase {
    pub fn new(queue: Arc<dyn JobQueue>, pages: Arc<dyn PageRepository>) -> Self {
        Self { queue, pages }
    }

    pub async fn execute(&self, job: PageGenerationJob) -> Result<(), DomainError> {
        self.pages.mark_generating(job.page_id, job.variant).await?;
        self.queue.enqueue(&job).await?;
        info!(
            page_id = job.page_id,
            variant = job.variant.as_str(),
            action = job.action.as_str(),
            "Page generation job enqueued"
        );
        Ok(())
    }
}
