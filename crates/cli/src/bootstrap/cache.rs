use autoguard_domain::config::CacheConfig;
use autoguard_infrastructure::{RedisJobQueue, RedisLogQueue, SharedCache};
use std::sync::Arc;
use tracing::info;

pub async fn init_cache(
    cfg: &CacheConfig,
) -> anyhow::Result<(SharedCache, Arc<RedisLogQueue>, Arc<RedisJobQueue>)> {
    let cache = SharedCache::connect(cfg).await?;
    info!(url = %cfg.redis_url, "Shared cache connected");

    let log_queue = Arc::new(RedisLogQueue::new(cache.clone()).await?);
    let job_queue = Arc::new(RedisJobQueue::new(cache.clone()).await?);

    Ok((cache, log_queue, job_queue))
}
