use super::GeoIpService;
use crate::cache::SharedCache;
use async_trait::async_trait;
use autoguard_application::ports::IpIntelligencePort;
use autoguard_domain::config::CacheConfig;
use autoguard_domain::IpIntelligence;
use lru::LruCache;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Two-tier cached IP intelligence: an in-process LRU fronts the shared
/// cache (`autoguard:geoip:{ip}`), both with the same TTL. Misses fall
/// through to the mmap-backed GeoIP readers on the blocking pool.
///
/// The decision deadline propagates through the cancellation token: a
/// cancelled lookup returns a failed (all-unknown) result immediately and
/// lets the database read finish in the background for the next caller.
pub struct CachedIpIntelligence {
    geoip: Arc<GeoIpService>,
    cache: SharedCache,
    local: Mutex<LruCache<IpAddr, (IpIntelligence, Instant)>>,
    ttl: Duration,
}

impl CachedIpIntelligence {
    pub fn new(geoip: Arc<GeoIpService>, cache: SharedCache, cfg: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(cfg.geoip_local_capacity.max(1))
            .expect("capacity is at least one");
        Self {
            geoip,
            cache,
            local: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(cfg.geoip_ttl_secs),
        }
    }

    fn local_get(&self, ip: IpAddr) -> Option<IpIntelligence> {
        let mut cache = self.local.lock().expect("geoip local cache poisoned");
        if let Some((intel, inserted_at)) = cache.get(&ip) {
            if inserted_at.elapsed() < self.ttl {
                return Some(intel.clone());
            }
            cache.pop(&ip);
        }
        None
    }

    fn local_put(&self, ip: IpAddr, intel: &IpIntelligence) {
        let mut cache = self.local.lock().expect("geoip local cache poisoned");
        cache.put(ip, (intel.clone(), Instant::now()));
    }

    fn shared_key(&self, ip: IpAddr) -> String {
        self.cache.key(&format!("geoip:{ip}"))
    }
}

#[async_trait]
impl IpIntelligencePort for CachedIpIntelligence {
    async fn lookup(&self, ip: IpAddr, cancel: &CancellationToken) -> IpIntelligence {
        if let Some(intel) = self.local_get(ip) {
            return intel;
        }

        let key = self.shared_key(ip);
        let shared = tokio::select! {
            value = self.cache.get_json::<IpIntelligence>(&key) => value,
            _ = cancel.cancelled() => return IpIntelligence::failed(ip),
        };
        if let Some(intel) = shared {
            self.local_put(ip, &intel);
            return intel;
        }

        // Miss on both tiers: hit the databases off the async runtime.
        let geoip = Arc::clone(&self.geoip);
        let handle = tokio::task::spawn_blocking(move || geoip.lookup_sync(ip));
        let intel = tokio::select! {
            joined = handle => match joined {
                Ok(intel) => intel,
                Err(e) => {
                    warn!(%ip, error = %e, "GeoIP lookup task failed");
                    IpIntelligence::failed(ip)
                }
            },
            _ = cancel.cancelled() => return IpIntelligence::failed(ip),
        };

        self.local_put(ip, &intel);
        self.cache
            .set_json_ex(&key, &intel, self.ttl.as_secs())
            .await;
        intel
    }
}
