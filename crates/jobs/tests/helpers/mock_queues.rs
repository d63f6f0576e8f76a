use async_trait::async_trait;
use autoguard_application::ports::{
    DecisionLogQueue, DecisionLogRepository, GeneratedPage, JobQueue, PageGenerator,
    PageRepository, PageStore, QueueDepths,
};
use autoguard_domain::{
    DeadLetterRecord, DecisionLogRecord, DomainError, PageGenerationJob, PageStatus, Variant,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory job queue mirroring the two-list + delayed + dead layout.
/// Scheduled retries are recorded and immediately re-queued so tests can
/// walk the whole retry ladder without sleeping.
#[derive(Default)]
pub struct MockJobQueue {
    pending: Mutex<VecDeque<String>>,
    processing: Mutex<Vec<String>>,
    dead: Mutex<Vec<DeadLetterRecord>>,
    pub recorded_delays_ms: Mutex<Vec<u64>>,
}

impl MockJobQueue {
    pub fn with_jobs(jobs: &[PageGenerationJob]) -> Self {
        let queue = Self::default();
        {
            let mut pending = queue.pending.lock().unwrap();
            for job in jobs {
                pending.push_back(serde_json::to_string(job).unwrap());
            }
        }
        queue
    }

    pub fn push_raw(&self, raw: &str) {
        self.pending.lock().unwrap().push_back(raw.to_string());
    }

    pub fn push_processing(&self, raw: &str) {
        self.processing.lock().unwrap().push(raw.to_string());
    }

    pub fn dead_records(&self) -> Vec<DeadLetterRecord> {
        self.dead.lock().unwrap().clone()
    }

    pub fn is_drained(&self) -> bool {
        self.pending.lock().unwrap().is_empty() && self.processing.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl JobQueue for MockJobQueue {
    async fn enqueue(&self, job: &PageGenerationJob) -> Result<(), DomainError> {
        self.pending
            .lock()
            .unwrap()
            .push_back(serde_json::to_string(job).unwrap());
        Ok(())
    }

    async fn reserve(&self, _timeout: Duration) -> Result<Option<String>, DomainError> {
        let taken = {
            let mut pending = self.pending.lock().unwrap();
            pending.pop_front()
        };
        match taken {
            Some(raw) => {
                self.processing.lock().unwrap().push(raw.clone());
                Ok(Some(raw))
            }
            None => {
                // Keep the dispatcher loop from spinning hot in tests.
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(None)
            }
        }
    }

    async fn ack(&self, raw: &str) -> Result<(), DomainError> {
        let mut processing = self.processing.lock().unwrap();
        if let Some(pos) = processing.iter().position(|r| r == raw) {
            processing.remove(pos);
        }
        Ok(())
    }

    async fn schedule_retry(
        &self,
        job: &PageGenerationJob,
        delay: Duration,
    ) -> Result<(), DomainError> {
        self.recorded_delays_ms
            .lock()
            .unwrap()
            .push(delay.as_millis() as u64);
        // Immediately due, as if the mover already ran.
        self.pending
            .lock()
            .unwrap()
            .push_back(serde_json::to_string(job).unwrap());
        Ok(())
    }

    async fn dead_letter(&self, record: &DeadLetterRecord) -> Result<(), DomainError> {
        self.dead.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn move_due_delayed(&self, _max: usize) -> Result<u64, DomainError> {
        Ok(0)
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        let mut processing = self.processing.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();
        let moved = processing.len() as u64;
        for raw in processing.drain(..) {
            pending.push_back(raw);
        }
        Ok(moved)
    }

    async fn depths(&self) -> Result<QueueDepths, DomainError> {
        Ok(QueueDepths {
            pending: self.pending.lock().unwrap().len() as u64,
            processing: self.processing.lock().unwrap().len() as u64,
            delayed: 0,
            dead: self.dead.lock().unwrap().len() as u64,
        })
    }
}

#[derive(Default)]
pub struct MockPageRepository {
    pub statuses: Mutex<HashMap<(i64, Variant), (PageStatus, Option<String>)>>,
}

impl MockPageRepository {
    pub fn status_of(&self, page_id: i64, variant: Variant) -> Option<PageStatus> {
        self.statuses
            .lock()
            .unwrap()
            .get(&(page_id, variant))
            .map(|(status, _)| *status)
    }

    pub fn error_of(&self, page_id: i64, variant: Variant) -> Option<String> {
        self.statuses
            .lock()
            .unwrap()
            .get(&(page_id, variant))
            .and_then(|(_, error)| error.clone())
    }
}

#[async_trait]
impl PageRepository for MockPageRepository {
    async fn mark_generating(&self, page_id: i64, variant: Variant) -> Result<(), DomainError> {
        self.statuses
            .lock()
            .unwrap()
            .insert((page_id, variant), (PageStatus::Generating, None));
        Ok(())
    }

    async fn mark_generated(&self, page_id: i64, variant: Variant) -> Result<(), DomainError> {
        self.statuses
            .lock()
            .unwrap()
            .insert((page_id, variant), (PageStatus::Generated, None));
        Ok(())
    }

    async fn record_attempt_error(
        &self,
        page_id: i64,
        variant: Variant,
        error: &str,
    ) -> Result<(), DomainError> {
        self.statuses.lock().unwrap().insert(
            (page_id, variant),
            (PageStatus::Generating, Some(error.to_string())),
        );
        Ok(())
    }

    async fn mark_failed(
        &self,
        page_id: i64,
        variant: Variant,
        error: &str,
    ) -> Result<(), DomainError> {
        self.statuses.lock().unwrap().insert(
            (page_id, variant),
            (PageStatus::Failed, Some(error.to_string())),
        );
        Ok(())
    }
}

/// Generator that fails a scripted number of times before succeeding.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub failures_remaining: Mutex<u32>,
    pub calls: Mutex<u32>,
}

impl ScriptedGenerator {
    pub fn failing(times: u32) -> Self {
        Self {
            failures_remaining: Mutex::new(times),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PageGenerator for ScriptedGenerator {
    async fn generate(&self, _job: &PageGenerationJob) -> Result<GeneratedPage, DomainError> {
        *self.calls.lock().unwrap() += 1;
        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(DomainError::PageGenerationFailed(
                "scripted failure".to_string(),
            ));
        }
        Ok(GeneratedPage {
            html: "<html>ok</html>".to_string(),
            assets: vec![],
        })
    }
}

#[derive(Default)]
pub struct MemoryPageStore {
    pub written: Mutex<Vec<(String, Variant)>>,
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn write_page(
        &self,
        subdomain: &str,
        variant: Variant,
        _page: &GeneratedPage,
    ) -> Result<(), DomainError> {
        self.written
            .lock()
            .unwrap()
            .push((subdomain.to_string(), variant));
        Ok(())
    }
}

/// In-memory decision-log queue with the same two-list semantics.
#[derive(Default)]
pub struct MockLogQueue {
    pending: Mutex<VecDeque<String>>,
    processing: Mutex<Vec<String>>,
}

impl MockLogQueue {
    pub fn with_records(records: &[DecisionLogRecord]) -> Self {
        let queue = Self::default();
        {
            let mut pending = queue.pending.lock().unwrap();
            for record in records {
                pending.push_back(serde_json::to_string(record).unwrap());
            }
        }
        queue
    }

    pub fn push_raw(&self, raw: &str) {
        self.pending.lock().unwrap().push_back(raw.to_string());
    }

    pub fn push_processing(&self, raw: &str) {
        self.processing.lock().unwrap().push(raw.to_string());
    }

    pub fn processing_len(&self) -> usize {
        self.processing.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionLogQueue for MockLogQueue {
    async fn enqueue(&self, record: &DecisionLogRecord) -> Result<(), DomainError> {
        self.pending
            .lock()
            .unwrap()
            .push_back(serde_json::to_string(record).unwrap());
        Ok(())
    }

    async fn reserve_batch(
        &self,
        max: usize,
        _block_wait: Duration,
    ) -> Result<Vec<String>, DomainError> {
        let mut batch = Vec::new();
        {
            let mut pending = self.pending.lock().unwrap();
            let mut processing = self.processing.lock().unwrap();
            while batch.len() < max {
                match pending.pop_front() {
                    Some(raw) => {
                        processing.push(raw.clone());
                        batch.push(raw);
                    }
                    None => break,
                }
            }
        }
        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(batch)
    }

    async fn ack(&self, raw: &str) -> Result<(), DomainError> {
        let mut processing = self.processing.lock().unwrap();
        if let Some(pos) = processing.iter().position(|r| r == raw) {
            processing.remove(pos);
        }
        Ok(())
    }

    async fn requeue(&self, raw: &str) -> Result<(), DomainError> {
        self.ack(raw).await?;
        self.pending.lock().unwrap().push_back(raw.to_string());
        Ok(())
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        let mut processing = self.processing.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();
        let moved = processing.len() as u64;
        for raw in processing.drain(..) {
            pending.push_back(raw);
        }
        Ok(moved)
    }

    async fn pending_len(&self) -> Result<u64, DomainError> {
        Ok(self.pending.lock().unwrap().len() as u64)
    }
}

/// Repository that fails the first `fail_times` batches, then stores.
#[derive(Default)]
pub struct MockLogRepository {
    pub fail_times: Mutex<u32>,
    pub stored: Mutex<Vec<DecisionLogRecord>>,
}

impl MockLogRepository {
    pub fn failing(times: u32) -> Self {
        Self {
            fail_times: Mutex::new(times),
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionLogRepository for MockLogRepository {
    async fn insert_batch(&self, records: &[DecisionLogRecord]) -> Result<(), DomainError> {
        {
            let mut fail_times = self.fail_times.lock().unwrap();
            if *fail_times > 0 {
                *fail_times -= 1;
                return Err(DomainError::DatabaseError("scripted failure".to_string()));
            }
        }
        self.stored.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}
