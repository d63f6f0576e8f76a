use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Namespace prefix for every shared-cache key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// TTL for cached offer rows, seconds.
    #[serde(default = "default_offer_ttl_secs")]
    pub offer_ttl_secs: u64,

    /// TTL for cached IP-intelligence results, seconds. Applies to both the
    /// in-process tier and the shared tier.
    #[serde(default = "default_geoip_ttl_secs")]
    pub geoip_ttl_secs: u64,

    /// Capacity of the in-process IP-intelligence tier.
    #[serde(default = "default_geoip_local_capacity")]
    pub geoip_local_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            offer_ttl_secs: default_offer_ttl_secs(),
            geoip_ttl_secs: default_geoip_ttl_secs(),
            geoip_local_capacity: default_geoip_local_capacity(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "autoguard:".to_string()
}

fn default_offer_ttl_secs() -> u64 {
    300
}

fn default_geoip_ttl_secs() -> u64 {
    300
}

fn default_geoip_local_capacity() -> usize {
    10_000
}
