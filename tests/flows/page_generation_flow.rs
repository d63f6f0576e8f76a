//! Page-generation flow: enqueue through the use case, process through the
//! worker, then serve the written file through the gateway's inline mode.

#[path = "../common/fixtures.rs"]
mod fixtures;

use async_trait::async_trait;
use autoguard_application::ports::{
    GeneratedPage, PageGenerator, PageRepository,
};
use autoguard_application::use_cases::EnqueuePageJobUseCase;
use autoguard_domain::config::JobsConfig;
use autoguard_domain::{
    DomainError, JobAction, PageGenerationJob, PageStatus, Variant,
};
use autoguard_infrastructure::FileSystemPageStore;
use autoguard_jobs::PageWorkerJob;
use fixtures::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct MemoryPages {
    statuses: Mutex<HashMap<(i64, Variant), PageStatus>>,
}

impl MemoryPages {
    fn status_of(&self, page_id: i64, variant: Variant) -> Option<PageStatus> {
        self.statuses.lock().unwrap().get(&(page_id, variant)).copied()
    }
}

#[async_trait]
impl PageRepository for MemoryPages {
    async fn mark_generating(&self, page_id: i64, variant: Variant) -> Result<(), DomainError> {
        self.statuses
            .lock()
            .unwrap()
            .insert((page_id, variant), PageStatus::Generating);
        Ok(())
    }

    async fn mark_generated(&self, page_id: i64, variant: Variant) -> Result<(), DomainError> {
        self.statuses
            .lock()
            .unwrap()
            .insert((page_id, variant), PageStatus::Generated);
        Ok(())
    }

    async fn record_attempt_error(
        &self,
        page_id: i64,
        variant: Variant,
        _error: &str,
    ) -> Result<(), DomainError> {
        self.statuses
            .lock()
            .unwrap()
            .insert((page_id, variant), PageStatus::Generating);
        Ok(())
    }

    async fn mark_failed(
        &self,
        page_id: i64,
        variant: Variant,
        _error: &str,
    ) -> Result<(), DomainError> {
        self.statuses
            .lock()
            .unwrap()
            .insert((page_id, variant), PageStatus::Failed);
        Ok(())
    }
}

struct FlakyGenerator {
    failures_remaining: Mutex<u32>,
}

#[async_trait]
impl PageGenerator for FlakyGenerator {
    async fn generate(&self, job: &PageGenerationJob) -> Result<GeneratedPage, DomainError> {
        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(DomainError::PageGenerationFailed("scrape timeout".to_string()));
        }
        Ok(GeneratedPage {
            html: format!("<html>variant {}</html>", job.variant.as_str()),
            assets: vec![],
        })
    }
}

fn job_config() -> JobsConfig {
    JobsConfig {
        max_attempts: 3,
        retry_base_ms: 2_000,
        retry_max_ms: 60_000,
        retry_jitter: 0.0,
        max_concurrent: 2,
        poll_timeout_secs: 1,
        shutdown_grace_secs: 5,
        ..JobsConfig::default()
    }
}

#[tokio::test]
async fn enqueue_process_write_and_mark_generated() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(MemoryJobQueue::default());
    let pages = Arc::new(MemoryPages::default());
    let store = Arc::new(FileSystemPageStore::new(dir.path()));
    let shutdown = CancellationToken::new();

    // Enqueue through the same use case the admin endpoint calls. Two
    // failures then success exercises the whole retry ladder in passing.
    let enqueue = EnqueuePageJobUseCase::new(queue.clone(), pages.clone());
    enqueue
        .execute(PageGenerationJob {
            page_id: 5,
            offer_id: 1,
            variant: Variant::A,
            action: JobAction::Scrape,
            source_url: "https://example.com/offer".to_string(),
            subdomain: "ab12cd".to_string(),
            safe_page_style: None,
            competitors: vec![],
            attempt: 0,
        })
        .await
        .unwrap();
    assert_eq!(pages.status_of(5, Variant::A), Some(PageStatus::Generating));

    let worker = PageWorkerJob::new(
        queue.clone(),
        pages.clone(),
        Arc::new(FlakyGenerator {
            failures_remaining: Mutex::new(2),
        }),
        store,
        job_config(),
    )
    .with_cancellation(shutdown.clone());
    Arc::new(worker).start().await;

    // Act + Assert - the page row converges to generated
    assert!(
        wait_for(
            || pages.status_of(5, Variant::A) == Some(PageStatus::Generated),
            Duration::from_secs(3),
        )
        .await
    );
    assert_eq!(queue.dead_len(), 0);
    assert!(wait_for(|| queue.is_drained(), Duration::from_secs(2)).await);

    // The file landed at the exact path the gateway maps.
    let html = std::fs::read_to_string(dir.path().join("ab12cd/a/index.html")).unwrap();
    assert_eq!(html, "<html>variant a</html>");

    shutdown.cancel();
}

#[tokio::test]
async fn exhausted_job_lands_in_dead_letter_queue() {
    // Arrange - generator that never succeeds
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(MemoryJobQueue::default());
    let pages = Arc::new(MemoryPages::default());
    let shutdown = CancellationToken::new();

    let enqueue = EnqueuePageJobUseCase::new(queue.clone(), pages.clone());
    enqueue
        .execute(PageGenerationJob {
            page_id: 6,
            offer_id: 1,
            variant: Variant::B,
            action: JobAction::AiGenerate,
            source_url: "https://example.com/offer".to_string(),
            subdomain: "ab12cd".to_string(),
            safe_page_style: Some("ecommerce".to_string()),
            competitors: vec![],
            attempt: 0,
        })
        .await
        .unwrap();

    let worker = PageWorkerJob::new(
        queue.clone(),
        pages.clone(),
        Arc::new(FlakyGenerator {
            failures_remaining: Mutex::new(u32::MAX),
        }),
        Arc::new(FileSystemPageStore::new(dir.path())),
        job_config(),
    )
    .with_cancellation(shutdown.clone());
    Arc::new(worker).start().await;

    // Act + Assert
    assert!(
        wait_for(
            || pages.status_of(6, Variant::B) == Some(PageStatus::Failed),
            Duration::from_secs(3),
        )
        .await
    );
    assert_eq!(queue.dead_len(), 1);

    shutdown.cancel();
}
