use super::cidr::{canonical_ip, ip_in_cidr};
use super::ua_match::ua_matches;
use crate::cache::SharedCache;
use async_trait::async_trait;
use autoguard_application::ports::BlacklistStore;
use autoguard_domain::{BlacklistHit, BlacklistScope, DomainError, UaPattern};
use ipnet::IpNet;
use redis::AsyncCommands;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Blacklist membership tests over the shared-cache projection.
///
/// The projection (sets, lists and hashes per kind and scope) is rebuilt
/// from the primary store by `rebuild_cache`; lookups only ever touch
/// Redis. Every lookup checks global scope before the tenant scope, so a
/// global denial is always reported as global even when the tenant holds a
/// matching entry too.
pub struct RedisBlacklistStore {
    cache: SharedCache,
    pool: SqlitePool,
}

/// Per-scope accumulator for a rebuild.
#[derive(Default)]
struct ScopeBuild {
    ips: Vec<String>,
    ranges: Vec<String>,
    uas: Vec<String>,
    asns: Vec<String>,
    isp_names: Vec<String>,
    geos: Vec<(String, String)>,
}

impl RedisBlacklistStore {
    pub fn new(cache: SharedCache, pool: SqlitePool) -> Self {
        Self { cache, pool }
    }

    /// Global first, then tenant.
    fn scopes(tenant_id: i64) -> [(BlacklistScope, String); 2] {
        [
            (BlacklistScope::Global, "global".to_string()),
            (BlacklistScope::Tenant(tenant_id), format!("user:{tenant_id}")),
        ]
    }

    fn key(&self, kind: &str, scope: &str) -> String {
        self.cache.key(&format!("blacklist:{kind}:{scope}"))
    }

    /// One retry, then degrade to a miss: the decision pipeline must keep
    /// answering while the cache is down.
    async fn redis_try<T, F, Fut>(op: &'static str, mut call: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = redis::RedisResult<T>>,
    {
        for attempt in 0..2u8 {
            match call().await {
                Ok(value) => return Some(value),
                Err(e) if attempt == 0 => {
                    debug!(op, error = %e, "Blacklist cache read failed, retrying once");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                Err(e) => {
                    warn!(op, error = %e, "Blacklist cache unavailable, degrading to no-hit");
                }
            }
        }
        None
    }
}

#[async_trait]
impl BlacklistStore for RedisBlacklistStore {
    async fn is_ip_blocked(
        &self,
        ip: IpAddr,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        let canonical = canonical_ip(ip);
        let mut candidates = vec![canonical.to_string()];
        if canonical != ip {
            candidates.push(ip.to_string());
        }

        for (scope, scope_key) in Self::scopes(tenant_id) {
            let key = self.key("ip", &scope_key);
            for candidate in &candidates {
                let hit = Self::redis_try("sismember ip", || {
                    let mut conn = self.cache.conn();
                    let key = key.clone();
                    let member = candidate.clone();
                    async move { conn.sismember::<_, _, bool>(key, member).await }
                })
                .await
                .unwrap_or(false);
                if hit {
                    return Ok(Some(BlacklistHit::new("ip", candidate.clone(), scope)));
                }
            }
        }
        Ok(None)
    }

    async fn is_cidr_hit(
        &self,
        ip: IpAddr,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        for (scope, scope_key) in Self::scopes(tenant_id) {
            let key = self.key("ip_ranges", &scope_key);
            let raw = Self::redis_try("get ip_ranges", || {
                let mut conn = self.cache.conn();
                let key = key.clone();
                async move { conn.get::<_, Option<String>>(key).await }
            })
            .await
            .flatten();

            let Some(raw) = raw else { continue };
            let ranges: Vec<String> = match serde_json::from_str(&raw) {
                Ok(ranges) => ranges,
                Err(e) => {
                    warn!(key, error = %e, "Undecodable CIDR range list, skipping scope");
                    continue;
                }
            };

            for range in ranges {
                let Ok(net) = range.parse::<IpNet>() else {
                    continue;
                };
                if ip_in_cidr(ip, &net) {
                    return Ok(Some(BlacklistHit::new("cidr", range, scope)));
                }
            }
        }
        Ok(None)
    }

    async fn is_ua_blocked(
        &self,
        user_agent: &str,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        for (scope, scope_key) in Self::scopes(tenant_id) {
            let key = self.key("uas", &scope_key);
            let entries = Self::redis_try("lrange uas", || {
                let mut conn = self.cache.conn();
                let key = key.clone();
                async move { conn.lrange::<_, Vec<String>>(key, 0, -1).await }
            })
            .await
            .unwrap_or_default();

            for raw in entries {
                let pattern = UaPattern::decode(&raw);
                if ua_matches(&pattern, user_agent) {
                    return Ok(Some(BlacklistHit::new("user_agent", pattern.pattern, scope)));
                }
            }
        }
        Ok(None)
    }

    async fn is_isp_blocked(
        &self,
        asn: Option<u32>,
        org_name: Option<&str>,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        for (scope, scope_key) in Self::scopes(tenant_id) {
            if let Some(asn) = asn {
                let key = self.key("isps", &scope_key);
                let hit = Self::redis_try("sismember isps", || {
                    let mut conn = self.cache.conn();
                    let key = key.clone();
                    async move { conn.sismember::<_, _, bool>(key, asn).await }
                })
                .await
                .unwrap_or(false);
                if hit {
                    return Ok(Some(BlacklistHit::new("asn", format!("AS{asn}"), scope)));
                }
            }

            if let Some(org) = org_name {
                let names_key = format!("{}:names", self.key("isps", &scope_key));
                let names = Self::redis_try("hgetall isp names", || {
                    let mut conn = self.cache.conn();
                    let key = names_key.clone();
                    async move { conn.hgetall::<_, HashMap<String, String>>(key).await }
                })
                .await
                .unwrap_or_default();

                let org_lc = org.to_lowercase();
                if let Some((_, original)) =
                    names.iter().find(|(name, _)| org_lc.contains(name.as_str()))
                {
                    return Ok(Some(BlacklistHit::new("isp", original.clone(), scope)));
                }
            }
        }
        Ok(None)
    }

    async fn is_geo_blocked(
        &self,
        country: Option<&str>,
        region: Option<&str>,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        let Some(country) = country else {
            return Ok(None);
        };

        for (scope, scope_key) in Self::scopes(tenant_id) {
            let key = self.key("geos", &scope_key);
            let mut fields = vec![country.to_string()];
            if let Some(region) = region {
                fields.push(format!("{country}:{region}"));
            }

            for field in fields {
                let block_type = Self::redis_try("hget geos", || {
                    let mut conn = self.cache.conn();
                    let key = key.clone();
                    let field = field.clone();
                    async move { conn.hget::<_, _, Option<String>>(key, field).await }
                })
                .await
                .flatten();

                // Only hard blocks match here; high_risk entries feed L3
                // scoring, not the blacklist layer.
                if block_type.as_deref() == Some("block") {
                    return Ok(Some(BlacklistHit::new("geo", field, scope)));
                }
            }
        }
        Ok(None)
    }

    /// Reread active, unexpired rows from the primary store and atomically
    /// replace the projection: staging keys are populated first, then a
    /// single MULTI/EXEC swaps them in and clears keys with no remaining
    /// entries. Readers see either the old projection or the new one.
    async fn rebuild_cache(&self) -> Result<(), DomainError> {
        let rows = sqlx::query(
            "SELECT user_id, kind, value, match_type, block_type
             FROM blacklist_entries
             WHERE active = 1
               AND (expires_at IS NULL OR expires_at > datetime('now'))",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut builds: HashMap<String, ScopeBuild> = HashMap::new();
        for row in &rows {
            let scope = match row.get::<Option<i64>, _>("user_id") {
                Some(uid) => format!("user:{uid}"),
                None => "global".to_string(),
            };
            let kind: String = row.get("kind");
            let value: String = row.get("value");
            let build = builds.entry(scope).or_default();

            match kind.as_str() {
                "ip" => build.ips.push(value),
                "cidr" => build.ranges.push(value),
                "user_agent" => {
                    let entry = match row.get::<Option<String>, _>("match_type") {
                        Some(match_type) => serde_json::json!({
                            "pattern": value,
                            "type": match_type,
                        })
                        .to_string(),
                        None => value,
                    };
                    build.uas.push(entry);
                }
                "asn" => build.asns.push(value),
                "isp" => build.isp_names.push(value),
                "geo" => {
                    let block_type = row
                        .get::<Option<String>, _>("block_type")
                        .unwrap_or_else(|| "block".to_string());
                    build.geos.push((value, block_type));
                }
                other => warn!(kind = other, "Unknown blacklist kind in primary store, skipped"),
            }
        }

        let mut conn = self.cache.conn();

        // Existing live keys: anything not rebuilt below gets cleared in
        // the swap so stale scopes cannot linger.
        let pattern = self.cache.key("blacklist:*");
        let mut existing: Vec<String> = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(pattern)
                .await
                .map_err(|e| DomainError::CacheError(e.to_string()))?;
            while let Some(key) = iter.next_item().await {
                if !key.ends_with(":staging") {
                    existing.push(key);
                }
            }
        }

        // Populate staging keys.
        fn add_staged(
            live: String,
            stage: &mut redis::Pipeline,
            staged: &mut Vec<(String, String)>,
        ) -> String {
            let staging = format!("{live}:staging");
            stage.del(&staging).ignore();
            staged.push((live, staging.clone()));
            staging
        }

        let mut staged: Vec<(String, String)> = Vec::new();
        let mut stage = redis::pipe();

        for (scope, build) in &builds {
            if !build.ips.is_empty() {
                let staging = add_staged(self.key("ip", scope), &mut stage, &mut staged);
                stage.sadd(&staging, &build.ips).ignore();
            }
            if !build.ranges.is_empty() {
                let staging = add_staged(self.key("ip_ranges", scope), &mut stage, &mut staged);
                let json = serde_json::to_string(&build.ranges)
                    .map_err(|e| DomainError::CacheError(e.to_string()))?;
                stage.set(&staging, json).ignore();
            }
            if !build.uas.is_empty() {
                let staging = add_staged(self.key("uas", scope), &mut stage, &mut staged);
                for ua in &build.uas {
                    stage.rpush(&staging, ua).ignore();
                }
            }
            if !build.asns.is_empty() {
                let staging = add_staged(self.key("isps", scope), &mut stage, &mut staged);
                stage.sadd(&staging, &build.asns).ignore();
            }
            if !build.isp_names.is_empty() {
                let staging = add_staged(
                    format!("{}:names", self.key("isps", scope)),
                    &mut stage,
                    &mut staged,
                );
                for name in &build.isp_names {
                    stage.hset(&staging, name.to_lowercase(), name).ignore();
                }
            }
            if !build.geos.is_empty() {
                let staging = add_staged(self.key("geos", scope), &mut stage, &mut staged);
                for (field, block_type) in &build.geos {
                    stage.hset(&staging, field, block_type).ignore();
                }
            }
        }

        stage
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        // Atomic swap: rename every staged key over its live key and drop
        // live keys that were not rebuilt.
        let mut swap = redis::pipe();
        swap.atomic();
        for key in &existing {
            if !staged.iter().any(|(live, _)| live == key) {
                swap.del(key).ignore();
            }
        }
        for (live, staging) in &staged {
            swap.cmd("RENAME").arg(staging).arg(live).ignore();
        }
        swap.query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        info!(
            entries = rows.len(),
            scopes = builds.len(),
            "Blacklist projection rebuilt"
        );
        Ok(())
    }
}
