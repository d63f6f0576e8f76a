#![allow(dead_code)]

use async_trait::async_trait;
use autoguard_application::ports::{
    BlacklistStore, DecisionLogQueue, IpIntelligencePort, JobQueue, OfferCache, OfferCacheKey,
    OfferRepository, QueueDepths,
};
use autoguard_domain::{
    BlacklistHit, ConnectionType, CustomDomainStatus, DeadLetterRecord, DecisionLogRecord,
    DomainError, IpIntelligence, Offer, OfferStatus, PageGenerationJob, Subdomain,
};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const CHROME_120: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn active_offer(id: i64, subdomain: &str) -> Offer {
    Offer {
        id,
        user_id: 10,
        subdomain: Subdomain::new(subdomain).unwrap(),
        custom_domain: None,
        custom_domain_status: CustomDomainStatus::None,
        cloak_enabled: true,
        target_countries: vec![],
        status: OfferStatus::Active,
        deleted: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn us_residential_intel() -> IpIntelligence {
    let mut intel = IpIntelligence::unknown("24.0.0.1".parse().unwrap());
    intel.country = Some("US".to_string());
    intel.city = Some("Newark".to_string());
    intel.is_residential = true;
    intel.connection_type = ConnectionType::Residential;
    intel
}

pub struct StaticOffers(pub Vec<Offer>);

#[async_trait]
impl OfferRepository for StaticOffers {
    async fn find_by_id(&self, id: i64) -> Result<Option<Offer>, DomainError> {
        Ok(self.0.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Offer>, DomainError> {
        Ok(self
            .0
            .iter()
            .find(|o| o.subdomain.as_str() == subdomain)
            .cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Offer>, DomainError> {
        Ok(self
            .0
            .iter()
            .find(|o| o.serves_custom_domain() && o.custom_domain.as_deref() == Some(domain))
            .cloned())
    }
}

pub struct NoCache;

#[async_trait]
impl OfferCache for NoCache {
    async fn get(&self, _key: &OfferCacheKey) -> Option<Offer> {
        None
    }

    async fn put(&self, _key: &OfferCacheKey, _offer: &Offer) {}

    async fn invalidate(&self, _offer: &Offer) {}
}

pub struct NoHits;

#[async_trait]
impl BlacklistStore for NoHits {
    async fn is_ip_blocked(
        &self,
        _ip: IpAddr,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(None)
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
        _ua: &str,
        _tenant_id: i64,
    ) -> Result<Option<BlacklistHit>, DomainError> {
        Ok(None)
    }

    async fn is_isp_blocked(
        &self,
        _asn: Option<u32>,
        _org: Option<&str>,
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

pub struct StaticIntel(pub IpIntelligence);

#[async_trait]
impl IpIntelligencePort for StaticIntel {
    async fn lookup(&self, _ip: IpAddr, _cancel: &CancellationToken) -> IpIntelligence {
        self.0.clone()
    }
}

/// In-memory decision-log queue with two-list semantics, shared between
/// the gateway side and the writer side of a flow test.
#[derive(Default)]
pub struct MemoryLogQueue {
    pending: Mutex<VecDeque<String>>,
    processing: Mutex<Vec<String>>,
}

impl MemoryLogQueue {
    pub fn depth(&self) -> usize {
        self.pending.lock().unwrap().len() + self.processing.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionLogQueue for MemoryLogQueue {
    async fn enqueue(&self, record: &DecisionLogRecord) -> Result<(), DomainError> {
        self.pending
            .lock()
            .unwrap()
            .push_back(serde_json::to_string(record).unwrap());
        Ok(())
    }

    async fn reserve_batch(
        &self,
        max: usize,
        _block_wait: Duration,
    ) -> Result<Vec<String>, DomainError> {
        let mut batch = Vec::new();
        {
            let mut pending = self.pending.lock().unwrap();
            let mut processing = self.processing.lock().unwrap();
            while batch.len() < max {
                match pending.pop_front() {
                    Some(raw) => {
                        processing.push(raw.clone());
                        batch.push(raw);
                    }
                    None => break,
                }
            }
        }
        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(batch)
    }

    async fn ack(&self, raw: &str) -> Result<(), DomainError> {
        let mut processing = self.processing.lock().unwrap();
        if let Some(pos) = processing.iter().position(|r| r == raw) {
            processing.remove(pos);
        }
        Ok(())
    }

    async fn requeue(&self, raw: &str) -> Result<(), DomainError> {
        self.ack(raw).await?;
        self.pending.lock().unwrap().push_back(raw.to_string());
        Ok(())
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        let mut processing = self.processing.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();
        let moved = processing.len() as u64;
        for raw in processing.drain(..) {
            pending.push_back(raw);
        }
        Ok(moved)
    }

    async fn pending_len(&self) -> Result<u64, DomainError> {
        Ok(self.pending.lock().unwrap().len() as u64)
    }
}

/// In-memory job queue with immediate-due retries.
#[derive(Default)]
pub struct MemoryJobQueue {
    pending: Mutex<VecDeque<String>>,
    processing: Mutex<Vec<String>>,
    dead: Mutex<Vec<DeadLetterRecord>>,
}

impl MemoryJobQueue {
    pub fn dead_len(&self) -> usize {
        self.dead.lock().unwrap().len()
    }

    pub fn is_drained(&self) -> bool {
        self.pending.lock().unwrap().is_empty() && self.processing.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, job: &PageGenerationJob) -> Result<(), DomainError> {
        self.pending
            .lock()
            .unwrap()
            .push_back(serde_json::to_string(job).unwrap());
        Ok(())
    }

    async fn reserve(&self, _timeout: Duration) -> Result<Option<String>, DomainError> {
        let taken = self.pending.lock().unwrap().pop_front();
        match taken {
            Some(raw) => {
                self.processing.lock().unwrap().push(raw.clone());
                Ok(Some(raw))
            }
            None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(None)
            }
        }
    }

    async fn ack(&self, raw: &str) -> Result<(), DomainError> {
        let mut processing = self.processing.lock().unwrap();
        if let Some(pos) = processing.iter().position(|r| r == raw) {
            processing.remove(pos);
        }
        Ok(())
    }

    async fn schedule_retry(
        &self,
        job: &PageGenerationJob,
        _delay: Duration,
    ) -> Result<(), DomainError> {
        self.pending
            .lock()
            .unwrap()
            .push_back(serde_json::to_string(job).unwrap());
        Ok(())
    }

    async fn dead_letter(&self, record: &DeadLetterRecord) -> Result<(), DomainError> {
        self.dead.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn move_due_delayed(&self, _max: usize) -> Result<u64, DomainError> {
        Ok(0)
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        let mut processing = self.processing.lock().unwrap();
        let mut pending = self.pending.lock().unwrap();
        let moved = processing.len() as u64;
        for raw in processing.drain(..) {
            pending.push_back(raw);
        }
        Ok(moved)
    }

    async fn depths(&self) -> Result<QueueDepths, DomainError> {
        Ok(QueueDepths {
            pending: self.pending.lock().unwrap().len() as u64,
            processing: self.processing.lock().unwrap().len() as u64,
            delayed: 0,
            dead: self.dead.lock().unwrap().len() as u64,
        })
    }
}

/// Poll until `predicate` holds or the deadline passes.
pub async fn wait_for<F: Fn() -> bool>(predicate: F, deadline: Duration) -> bool {
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}
