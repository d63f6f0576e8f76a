use async_trait::async_trait;
use autoguard_domain::{BlacklistHit, DomainError};
use std::net::IpAddr;

/// Membership tests over the blacklist projection in the shared cache.
///
/// Every test checks BOTH global scope and the tenant scope; a hit in either
/// is returned with its scope. Tenant entries extend the global set — they
/// can never override a global denial.
///
/// Transient cache errors are retried once inside the implementation and
/// then degrade to "no hit": the decision pipeline stays available when the
/// shared cache is down.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    async fn is_ip_blocked(
        &self,
        ip: IpAddr,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError>;

    async fn is_cidr_hit(
        &self,
        ip: IpAddr,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError>;

    async fn is_ua_blocked(
        &self,
        user_agent: &str,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError>;

    async fn is_isp_blocked(
        &self,
        asn: Option<u32>,
        org_name: Option<&str>,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError>;

    async fn is_geo_blocked(
        &self,
        country: Option<&str>,
        region: Option<&str>,
        tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError>;

    /// Reread the primary store and replace the cached projection. The swap
    /// is atomic from a reader's perspective: lookups see either the old or
    /// the new projection, never a partial rebuild.
    async fn rebuild_cache(&self) -> Result<(), DomainError>;
}
