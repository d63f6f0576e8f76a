use autoguard_domain::config::CacheConfig;
use autoguard_domain::DomainError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// The shared cache: one multiplexed Redis connection per process with
/// automatic reconnect, plus the `autoguard:` key namespace.
///
/// Read errors are retried once and then degrade to a miss; write errors
/// are logged and dropped. Nothing on the request path may fail because the
/// cache is down.
#[derive(Clone)]
pub struct SharedCache {
    client: redis::Client,
    manager: ConnectionManager,
    prefix: String,
}

impl SharedCache {
    pub async fn connect(cfg: &CacheConfig) -> Result<Self, DomainError> {
        let client = redis::Client::open(cfg.redis_url.as_str())
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        let manager = ConnectionManager::new(client.clone())
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        Ok(Self {
            client,
            manager,
            prefix: cfg.key_prefix.clone(),
        })
    }

    /// Namespaced key: `autoguard:` + suffix.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    /// A clone of the multiplexed connection for ad-hoc commands.
    pub fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// A dedicated connection for consumers that issue blocking commands
    /// (BRPOPLPUSH). Blocking on the shared multiplexed connection would
    /// stall every other caller.
    pub async fn dedicated_conn(&self) -> Result<ConnectionManager, DomainError> {
        ConnectionManager::new(self.client.clone())
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }

    /// JSON read with a single retry; any persistent failure reads as a
    /// miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_string_retry(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Dropping undecodable cache entry");
                None
            }
        }
    }

    /// JSON write with TTL; failures are dropped.
    pub async fn set_json_ex<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };
        let mut conn = self.conn();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, raw, ttl_secs).await {
            debug!(key, error = %e, "Cache write dropped");
        }
    }

    /// Delete keys; failures are dropped.
    pub async fn del(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        let mut conn = self.conn();
        if let Err(e) = conn.del::<_, ()>(keys).await {
            debug!(error = %e, "Cache delete dropped");
        }
    }

    async fn get_string_retry(&self, key: &str) -> Option<String> {
        let mut conn = self.conn();
        for attempt in 0..2 {
            match conn.get::<_, Option<String>>(key).await {
                Ok(value) => return value,
                Err(e) if attempt == 0 => {
                    debug!(key, error = %e, "Cache read failed, retrying once");
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                }
                Err(e) => {
                    warn!(key, error = %e, "Cache read failed, treating as miss");
                }
            }
        }
        None
    }
}
