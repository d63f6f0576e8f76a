use async_trait::async_trait;
use autoguard_application::ports::{
    BlacklistStore, DecisionLogQueue, IpIntelligencePort, OfferCache, OfferCacheKey,
    OfferRepository,
};
use autoguard_domain::{
    BlacklistHit, BlacklistScope, DecisionLogRecord, DomainError, IpIntelligence, Offer,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Blacklist store with a fixed set of hits keyed by kind.
#[derive(Default)]
pub struct FakeBlacklistStore {
    pub ip_hits: Vec<IpAddr>,
    pub ua_substrings: Vec<String>,
}

#[async_trait]
impl BlacklistStore for FakeBlacklistStore {
    async fn is_ip_blocked(
        &self,
        ip: IpAddr,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(self
            .ip_hits
            .contains(&ip)
            .then(|| BlacklistHit::new("ip", ip.to_string(), BlacklistScope::Global)))
    }

    async fn is_cidr_hit(
        &self,
        _ip: IpAddr,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(None)
    }

    async fn is_ua_blocked(
        &self,
        user_agent: &str,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(self
            .ua_substrings
            .iter()
            .find(|s| user_agent.contains(s.as_str()))
            .map(|s| BlacklistHit::new("user_agent", s.clone(), BlacklistScope::Global)))
    }

    async fn is_isp_blocked(
        &self,
        _asn: Option<u32>,
        _org_name: Option<&str>,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(None)
    }

    async fn is_geo_blocked(
        &self,
        _country: Option<&str>,
        _region: Option<&str>,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(None)
    }

    async fn rebuild_cache(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// IP-intelligence port returning canned results, with an optional stall to
/// exercise the decision deadline.
pub struct FakeIpIntelligence {
    pub results: HashMap<IpAddr, IpIntelligence>,
    pub stall: Option<Duration>,
}

impl FakeIpIntelligence {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            stall: None,
        }
    }

    pub fn with_result(mut self, intel: IpIntelligence) -> Self {
        self.results.insert(intel.ip, intel);
        self
    }

    pub fn with_stall(mut self, stall: Duration) -> Self {
        self.stall = Some(stall);
        self
    }
}

#[async_trait]
impl IpIntelligencePort for FakeIpIntelligence {
    async fn lookup(&self, ip: IpAddr, cancel: &CancellationToken) -> IpIntelligence {
        if let Some(stall) = self.stall {
            tokio::select! {
                _ = tokio::time::sleep(stall) => {}
                _ = cancel.cancelled() => return IpIntelligence::failed(ip),
            }
        }
        self.results
            .get(&ip)
            .cloned()
            .unwrap_or_else(|| IpIntelligence::unknown(ip))
    }
}

/// In-memory offer repository keyed by subdomain and domain.
#[derive(Default)]
pub struct FakeOfferRepository {
    pub offers: Vec<Offer>,
}

#[async_trait]
impl OfferRepository for FakeOfferRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Offer>, DomainError> {
        Ok(self.offers.iter().find(|o| o.id == id && !o.deleted).cloned())
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Offer>, DomainError> {
        Ok(self
            .offers
            .iter()
            .find(|o| o.subdomain.as_str() == subdomain && !o.deleted)
            .cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Offer>, DomainError> {
        Ok(self
            .offers
            .iter()
            .find(|o| {
                o.serves_custom_domain()
                    && o.custom_domain.as_deref() == Some(domain)
                    && !o.deleted
            })
            .cloned())
    }
}

/// Pass-through cache that never hits.
pub struct NoopOfferCache;

#[async_trait]
impl OfferCache for NoopOfferCache {
    async fn get(&self, _key: &OfferCacheKey) -> Option<Offer> {
        None
    }

    async fn put(&self, _key: &OfferCacheKey, _offer: &Offer) {}

    async fn invalidate(&self, _offer: &Offer) {}
}

/// Log queue capturing enqueued records.
#[derive(Default)]
pub struct CapturingLogQueue {
    pub records: Arc<Mutex<Vec<DecisionLogRecord>>>,
}

#[async_trait]
impl DecisionLogQueue for CapturingLogQueue {
    async fn enqueue(&self, record: &DecisionLogRecord) -> Result<(), DomainError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn reserve_batch(
        &self,
        _max: usize,
        _block_wait: Duration,
    ) -> Result<Vec<String>, DomainError> {
        Ok(vec![])
    }

    async fn ack(&self, _raw: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn requeue(&self, _raw: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        Ok(0)
    }

    async fn pending_len(&self) -> Result<u64, DomainError> {
        Ok(self.records.lock().await.len() as u64)
    }
}
