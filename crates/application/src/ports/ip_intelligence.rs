use async_trait::async_trait;
use autoguard_domain::IpIntelligence;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// Resolve an IP to geo/ASN/anonymity intelligence.
///
/// The call never fails: missing databases, unreadable records, and cache
/// outages all degrade to partial or unknown results. Implementations MUST
/// honor `cancel` — the decision deadline propagates through this token and
/// a cancelled lookup should return promptly with whatever it has.
#[async_trait]
pub trait IpIntelligencePort: Send + Sync {
    async fn lookup(&self, ip: IpAddr, cancel: &CancellationToken) -> IpIntelligence;
}
