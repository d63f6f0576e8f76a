use async_trait::async_trait;
use autoguard_application::ports::{
    BlacklistStore, DecisionLogQueue, DecisionLogRepository, IpIntelligencePort, JobQueue,
    OfferCache, OfferCacheKey, OfferRepository, PageRepository, QueueDepths,
};
use autoguard_application::use_cases::{
    EnqueuePageJobUseCase, GetQueueStatsUseCase, HandleVisitUseCase, RebuildBlacklistUseCase,
    ResolveOfferUseCase,
};
use autoguard_application::DecisionEngine;
use autoguard_domain::config::CloakConfig;
use autoguard_domain::{
    BlacklistHit, DeadLetterRecord, DecisionLogRecord, DomainError, IpIntelligence, Offer,
    PageGenerationJob, Variant,
};
use autoguard_gateway::AppState;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

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

#[derive(Default)]
pub struct RecordingLogQueue {
    pub records: Mutex<Vec<DecisionLogRecord>>,
}

#[async_trait]
impl DecisionLogQueue for RecordingLogQueue {
    async fn enqueue(&self, record: &DecisionLogRecord) -> Result<(), DomainError> {
        self.records.lock().unwrap().push(record.clone());
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
        Ok(self.records.lock().unwrap().len() as u64)
    }
}

#[derive(Default)]
pub struct RecordingJobQueue {
    pub enqueued: Mutex<Vec<PageGenerationJob>>,
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn enqueue(&self, job: &PageGenerationJob) -> Result<(), DomainError> {
        self.enqueued.lock().unwrap().push(job.clone());
        Ok(())
    }

    async fn reserve(&self, _timeout: Duration) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn ack(&self, _raw: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn schedule_retry(
        &self,
        _job: &PageGenerationJob,
        _delay: Duration,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn dead_letter(&self, _record: &DeadLetterRecord) -> Result<(), DomainError> {
        Ok(())
    }

    async fn move_due_delayed(&self, _max: usize) -> Result<u64, DomainError> {
        Ok(0)
    }

    async fn requeue_stuck(&self) -> Result<u64, DomainError> {
        Ok(0)
    }

    async fn depths(&self) -> Result<QueueDepths, DomainError> {
        Ok(QueueDepths {
            pending: self.enqueued.lock().unwrap().len() as u64,
            ..QueueDepths::default()
        })
    }
}

#[derive(Default)]
pub struct NoopPageRepository;

#[async_trait]
impl PageRepository for NoopPageRepository {
    async fn mark_generating(&self, _page_id: i64, _variant: Variant) -> Result<(), DomainError> {
        Ok(())
    }

    async fn mark_generated(&self, _page_id: i64, _variant: Variant) -> Result<(), DomainError> {
        Ok(())
    }

    async fn record_attempt_error(
        &self,
        _page_id: i64,
        _variant: Variant,
        _error: &str,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn mark_failed(
        &self,
        _page_id: i64,
        _variant: Variant,
        _error: &str,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

pub fn app_state(
    offers: Vec<Offer>,
    intel: IpIntelligence,
    page_root: PathBuf,
    accel_redirect: bool,
) -> (AppState, Arc<RecordingLogQueue>) {
    let resolver = Arc::new(ResolveOfferUseCase::new(
        Arc::new(StaticOffers(offers)),
        Arc::new(NoCache),
    ));
    let blacklist = Arc::new(NoHits);
    let engine = Arc::new(DecisionEngine::new(
        blacklist.clone(),
        Arc::new(StaticIntel(intel)),
        Arc::new(CloakConfig::default()),
    ));
    let log_queue = Arc::new(RecordingLogQueue::default());
    let job_queue = Arc::new(RecordingJobQueue::default());

    let state = AppState {
        handle_visit: Arc::new(HandleVisitUseCase::new(
            resolver.clone(),
            engine,
            log_queue.clone(),
        )),
        resolve_offer: resolver,
        rebuild_blacklist: Arc::new(RebuildBlacklistUseCase::new(blacklist)),
        enqueue_page_job: Arc::new(EnqueuePageJobUseCase::new(
            job_queue.clone(),
            Arc::new(NoopPageRepository),
        )),
        queue_stats: Arc::new(GetQueueStatsUseCase::new(job_queue, log_queue.clone())),
        page_root,
        accel_redirect,
    };
    (state, log_queue)
}
