use super::{JOB_DEAD_KEY, JOB_DELAYED_KEY, JOB_PROCESSING_KEY, JOB_QUEUE_KEY};
use crate::cache::SharedCache;
use async_trait::async_trait;
use autoguard_application::ports::{JobQueue, QueueDepths};
use autoguard_domain::{DeadLetterRecord, DomainError, PageGenerationJob};
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// Atomically move due members of the delayed zset into the pending list.
/// This script is the only mechanism that moves delayed jobs, so recovery
/// works across restarts with no in-process timer state.
const MOVE_DUE_SCRIPT: &str = r#"
local due = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1], 'LIMIT', 0, tonumber(ARGV[2]))
if #due == 0 then
    return 0
end
for _, raw in ipairs(due) do
    redis.call('ZREM', KEYS[1], raw)
    redis.call('LPUSH', KEYS[2], raw)
end
return #due
"#;

/// The durable page-generation queue: pending list, processing list,
/// delayed zset (score = unix-ms unlock time) and dead-letter list.
pub struct RedisJobQueue {
    cache: SharedCache,
    blocking: Mutex<ConnectionManager>,
    move_due: redis::Script,
}

impl RedisJobQueue {
    pub async fn new(cache: SharedCache) -> Result<Self, DomainError> {
        let blocking = cache.dedicated_conn().await?;
        Ok(Self {
            cache,
            blocking: Mutex::new(blocking),
            move_due: redis::Script::new(MOVE_DUE_SCRIPT),
        })
    }

    fn encode(job: &PageGenerationJob) -> Result<String, DomainError> {
        serde_json::to_string(job).map_err(|e| DomainError::InvalidJobPayload(e.to_string()))
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: &PageGenerationJob) -> Result<(), DomainError> {
        let raw = Self::encode(job)?;
        let mut conn = self.cache.conn();
        conn.lpush::<_, _, ()>(JOB_QUEUE_KEY, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn reserve(&self, timeout: Duration) -> Result<Option<String>, DomainError> {
        let mut conn = self.blocking.lock().await;
        conn.brpoplpush(JOB_QUEUE_KEY, JOB_PROCESSING_KEY, timeout.as_secs_f64())
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn ack(&self, raw: &str) -> Result<(), DomainError> {
        let mut conn = self.cache.conn();
        conn.lrem::<_, _, ()>(JOB_PROCESSING_KEY, 1, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn schedule_retry(
        &self,
        job: &PageGenerationJob,
        delay: Duration,
    ) -> Result<(), DomainError> {
        let raw = Self::encode(job)?;
        let unlock_at = Utc::now().timestamp_millis() + delay.as_millis() as i64;
        let mut conn = self.cache.conn();

        match conn
            .zadd::<_, _, _, ()>(JOB_DELAYED_KEY, &raw, unlock_at)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                // The delayed set is unavailable: re-queue immediately so
                // the job is not lost. Ordering degrades, delivery does not.
                warn!(error = %e, page_id = job.page_id, "Delayed set push failed, falling back to immediate re-queue");
                conn.lpush::<_, _, ()>(JOB_QUEUE_KEY, &raw)
                    .await
                    .map_err(|e| DomainError::QueueError(e.to_string()))
            }
        }
    }

    async fn dead_letter(&self, record: &DeadLetterRecord) -> Result<(), DomainError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| DomainError::InvalidJobPayload(e.to_string()))?;
        let mut conn = self.cache.conn();
        conn.lpush::<_, _, ()>(JOB_DEAD_KEY, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn move_due_delayed(&self, max: usize) -> Result<u64, DomainError> {
        let mut conn = self.cache.conn();
        let now_ms = Utc::now().timestamp_millis();
        let moved: u64 = self
            .move_due
            .key(JOB_DELAYED_KEY)
            .key(JOB_QUEUE_KEY)
            .arg(now_ms)
            .arg(max)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))?;
        Ok(moved)
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        let mut conn = self.cache.conn();
        let mut moved = 0u64;
        loop {
            let item: Option<String> = conn
                .rpoplpush(JOB_PROCESSING_KEY, JOB_QUEUE_KEY)
                .await
                .map_err(|e| DomainError::QueueError(e.to_string()))?;
            if item.is_none() {
                return Ok(moved);
            }
            moved += 1;
        }
    }

    async fn depths(&self) -> Result<QueueDepths, DomainError> {
        let mut conn = self.cache.conn();
        let (pending, processing, delayed, dead): (u64, u64, u64, u64) = redis::pipe()
            .llen(JOB_QUEUE_KEY)
            .llen(JOB_PROCESSING_KEY)
            .zcard(JOB_DELAYED_KEY)
            .llen(JOB_DEAD_KEY)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))?;
        Ok(QueueDepths {
            pending,
            processing,
            delayed,
            dead,
        })
    }
}
