use super::{LOG_PROCESSING_KEY, LOG_QUEUE_KEY};
use crate::cache::SharedCache;
use async_trait::async_trait;
use autoguard_application::ports::DecisionLogQueue;
use autoguard_domain::{DecisionLogRecord, DomainError};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::sync::Mutex;

/// The decision-log queue: `LPUSH` on the gateway side, a two-list
/// `RPOPLPUSH` reserve/ack protocol on the writer side.
///
/// Reservation uses a dedicated connection because BRPOPLPUSH blocks; the
/// gateway's enqueue path rides the shared multiplexed connection and never
/// blocks behind the writer.
pub struct RedisLogQueue {
    cache: SharedCache,
    blocking: Mutex<ConnectionManager>,
}

impl RedisLogQueue {
    pub async fn new(cache: SharedCache) -> Result<Self, DomainError> {
        let blocking = cache.dedicated_conn().await?;
        Ok(Self {
            cache,
            blocking: Mutex::new(blocking),
        })
    }
}

#[async_trait]
impl DecisionLogQueue for RedisLogQueue {
    async fn enqueue(&self, record: &DecisionLogRecord) -> Result<(), DomainError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| DomainError::QueueError(e.to_string()))?;
        let mut conn = self.cache.conn();
        conn.lpush::<_, _, ()>(LOG_QUEUE_KEY, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn reserve_batch(
        &self,
        max: usize,
        block_wait: Duration,
    ) -> Result<Vec<String>, DomainError> {
        let mut conn = self.blocking.lock().await;
        let mut batch = Vec::new();

        // Block (bounded) for the first record so an idle writer does not
        // spin; the remainder of the batch is taken non-blocking.
        let first: Option<String> = conn
            .brpoplpush(LOG_QUEUE_KEY, LOG_PROCESSING_KEY, block_wait.as_secs_f64())
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))?;
        let Some(first) = first else {
            return Ok(batch);
        };
        batch.push(first);

        while batch.len() < max {
            let next: Option<String> = conn
                .rpoplpush(LOG_QUEUE_KEY, LOG_PROCESSING_KEY)
                .await
                .map_err(|e| DomainError::QueueError(e.to_string()))?;
            match next {
                Some(raw) => batch.push(raw),
                None => break,
            }
        }
        Ok(batch)
    }

    async fn ack(&self, raw: &str) -> Result<(), DomainError> {
        let mut conn = self.cache.conn();
        conn.lrem::<_, _, ()>(LOG_PROCESSING_KEY, 1, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn requeue(&self, raw: &str) -> Result<(), DomainError> {
        let mut conn = self.cache.conn();
        conn.lrem::<_, _, ()>(LOG_PROCESSING_KEY, 1, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))?;
        conn.lpush::<_, _, ()>(LOG_QUEUE_KEY, raw)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        let mut conn = self.cache.conn();
        let mut moved = 0u64;
        loop {
            let item: Option<String> = conn
                .rpoplpush(LOG_PROCESSING_KEY, LOG_QUEUE_KEY)
                .await
                .map_err(|e| DomainError::QueueError(e.to_string()))?;
            if item.is_none() {
                return Ok(moved);
            }
            moved += 1;
        }
    }

    async fn pending_len(&self) -> Result<u64, DomainError> {
        let mut conn = self.cache.conn();
        conn.llen(LOG_QUEUE_KEY)
            .await
            .map_err(|e| DomainError::QueueError(e.to_string()))
    }
}
