use crate::cache::SharedCache;
use async_trait::async_trait;
use autoguard_application::ports::{OfferCache, OfferCacheKey, OfferRepository};
use autoguard_domain::{CustomDomainStatus, DomainError, Offer, OfferStatus, Subdomain};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{error, warn};

const OFFER_COLUMNS: &str = "id, user_id, subdomain, custom_domain, custom_domain_status,
                             cloak_enabled, target_countries, status, deleted,
                             datetime(created_at) as created_at,
                             datetime(updated_at) as updated_at";

pub struct SqliteOfferRepository {
    pool: SqlitePool,
}

impl SqliteOfferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Option<Offer> {
        let subdomain_raw: String = row.get("subdomain");
        let subdomain = match Subdomain::new(&subdomain_raw) {
            Ok(subdomain) => subdomain,
            Err(e) => {
                // A malformed row must never 500 the gateway; it simply
                // does not resolve.
                warn!(subdomain = %subdomain_raw, error = %e, "Skipping offer with invalid subdomain");
                return None;
            }
        };

        let target_countries: Vec<String> = row
            .get::<Option<String>, _>("target_countries")
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        let status_raw: String = row.get("status");
        let custom_domain_status = row
            .get::<Option<String>, _>("custom_domain_status")
            .and_then(|s| CustomDomainStatus::from_str(&s))
            .unwrap_or_default();

        Some(Offer {
            id: row.get("id"),
            user_id: row.get("user_id"),
            subdomain,
            custom_domain: row.get("custom_domain"),
            custom_domain_status,
            cloak_enabled: row.get::<i64, _>("cloak_enabled") != 0,
            target_countries,
            status: OfferStatus::from_str(&status_raw).unwrap_or(OfferStatus::Draft),
            deleted: row.get::<i64, _>("deleted") != 0,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn fetch_one(&self, sql: &str, bind: OfferBind<'_>) -> Result<Option<Offer>, DomainError> {
        let query = sqlx::query(sql);
        let query = match bind {
            OfferBind::Id(id) => query.bind(id),
            OfferBind::Text(text) => query.bind(text),
        };
        let row = query.fetch_optional(&self.pool).await.map_err(|e| {
            error!(error = %e, "Offer lookup failed");
            DomainError::DatabaseError(e.to_string())
        })?;
        Ok(row.as_ref().and_then(Self::map_row))
    }
}

enum OfferBind<'a> {
    Id(i64),
    Text(&'a str),
}

#[async_trait]
impl OfferRepository for SqliteOfferRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Offer>, DomainError> {
        let sql = format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = ? AND deleted = 0");
        self.fetch_one(&sql, OfferBind::Id(id)).await
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Offer>, DomainError> {
        let sql =
            format!("SELECT {OFFER_COLUMNS} FROM offers WHERE subdomain = ? AND deleted = 0");
        self.fetch_one(&sql, OfferBind::Text(subdomain)).await
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Offer>, DomainError> {
        let sql = format!(
            "SELECT {OFFER_COLUMNS} FROM offers
             WHERE lower(custom_domain) = lower(?)
               AND custom_domain_status = 'verified'
               AND deleted = 0"
        );
        self.fetch_one(&sql, OfferBind::Text(domain)).await
    }
}

/// Offer cache over the shared cache: `autoguard:offer:{id|subdomain|domain}:…`,
/// TTL from config (300 s). Failures degrade to misses.
pub struct RedisOfferCache {
    cache: SharedCache,
    ttl_secs: u64,
}

impl RedisOfferCache {
    pub fn new(cache: SharedCache, ttl_secs: u64) -> Self {
        Self { cache, ttl_secs }
    }

    fn cache_key(&self, key: &OfferCacheKey) -> String {
        self.cache.key(&key.suffix())
    }
}

#[async_trait]
impl OfferCache for RedisOfferCache {
    async fn get(&self, key: &OfferCacheKey) -> Option<Offer> {
        self.cache.get_json(&self.cache_key(key)).await
    }

    async fn put(&self, key: &OfferCacheKey, offer: &Offer) {
        self.cache
            .set_json_ex(&self.cache_key(key), offer, self.ttl_secs)
            .await;
    }

    async fn invalidate(&self, offer: &Offer) {
        let mut keys = vec![
            self.cache_key(&OfferCacheKey::Id(offer.id)),
            self.cache_key(&OfferCacheKey::Subdomain(
                offer.subdomain.as_str().to_string(),
            )),
        ];
        if let Some(domain) = &offer.custom_domain {
            keys.push(self.cache_key(&OfferCacheKey::Domain(domain.to_ascii_lowercase())));
        }
        self.cache.del(&keys).await;
    }
}
