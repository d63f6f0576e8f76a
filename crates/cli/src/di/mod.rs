use crate::bootstrap;
use autoguard_application::ports::{BlacklistStore, IpIntelligencePort};
use autoguard_application::use_cases::{
    EnqueuePageJobUseCase, GetQueueStatsUseCase, HandleVisitUseCase, RebuildBlacklistUseCase,
    ResolveOfferUseCase,
};
use autoguard_application::DecisionEngine;
use autoguard_domain::Config;
use autoguard_gateway::AppState;
use autoguard_infrastructure::{
    CachedIpIntelligence, FileSystemPageStore, HttpPageGenerator, RedisBlacklistStore,
    RedisJobQueue, RedisLogQueue, SharedCache, SqliteDecisionLogRepository, SqliteOfferRepository,
    SqlitePageRepository,
};
use autoguard_jobs::{DelayedMoverJob, JobRunner, LogWriterJob, PageWorkerJob, QueueMetricsJob};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The process-wide context: every shared handle is created here, exactly
/// once, and passed down explicitly. No global singletons.
pub struct Core {
    pub cache: SharedCache,
    pub log_queue: Arc<RedisLogQueue>,
    pub job_queue: Arc<RedisJobQueue>,
    pub log_repository: Arc<SqliteDecisionLogRepository>,
    pub page_repository: Arc<SqlitePageRepository>,
    pub page_store: Arc<FileSystemPageStore>,
    pub generator: Arc<HttpPageGenerator>,
    pub app_state: AppState,
}

impl Core {
    pub async fn assemble(config: &Config) -> anyhow::Result<Self> {
        let (write_pool, read_pool) =
            bootstrap::init_database(&config.database.path, &config.database).await?;
        let (cache, log_queue, job_queue) = bootstrap::init_cache(&config.cache).await?;
        let geoip = bootstrap::init_geoip(&config.geoip);

        let intel: Arc<dyn IpIntelligencePort> = Arc::new(CachedIpIntelligence::new(
            geoip,
            cache.clone(),
            &config.cache,
        ));
        let blacklist: Arc<dyn BlacklistStore> = Arc::new(RedisBlacklistStore::new(
            cache.clone(),
            read_pool.clone(),
        ));

        let policy = Arc::new(config.cloak.clone());
        let engine = Arc::new(DecisionEngine::new(blacklist.clone(), intel, policy));

        let resolver = Arc::new(ResolveOfferUseCase::new(
            Arc::new(SqliteOfferRepository::new(read_pool.clone())),
            Arc::new(autoguard_infrastructure::RedisOfferCache::new(
                cache.clone(),
                config.cache.offer_ttl_secs,
            )),
        ));

        let log_repository = Arc::new(SqliteDecisionLogRepository::new(write_pool.clone()));
        let page_repository = Arc::new(SqlitePageRepository::new(write_pool));
        let page_store = Arc::new(FileSystemPageStore::new(config.server.page_root.clone()));
        let generator = Arc::new(HttpPageGenerator::new(&config.generator)?);

        let app_state = AppState {
            handle_visit: Arc::new(HandleVisitUseCase::new(
                resolver.clone(),
                engine,
                log_queue.clone(),
            )),
            resolve_offer: resolver,
            rebuild_blacklist: Arc::new(RebuildBlacklistUseCase::new(blacklist)),
            enqueue_page_job: Arc::new(EnqueuePageJobUseCase::new(
                job_queue.clone(),
                page_repository.clone(),
            )),
            queue_stats: Arc::new(GetQueueStatsUseCase::new(
                job_queue.clone(),
                log_queue.clone(),
            )),
            page_root: PathBuf::from(&config.server.page_root),
            accel_redirect: config.server.accel_redirect,
        };

        Ok(Self {
            cache,
            log_queue,
            job_queue,
            log_repository,
            page_repository,
            page_store,
            generator,
            app_state,
        })
    }

    /// Register and start the background jobs, all wired to one
    /// cancellation token.
    pub async fn start_jobs(&self, config: &Config, shutdown: CancellationToken) {
        JobRunner::new()
            .with_log_writer(
                LogWriterJob::new(
                    self.log_queue.clone(),
                    self.log_repository.clone(),
                    &config.log_queue,
                )
                .with_cancellation(shutdown.clone()),
            )
            .with_page_worker(
                PageWorkerJob::new(
                    self.job_queue.clone(),
                    self.page_repository.clone(),
                    self.generator.clone(),
                    self.page_store.clone(),
                    config.jobs.clone(),
                )
                .with_cancellation(shutdown.clone()),
            )
            .with_delayed_mover(
                DelayedMoverJob::new(self.job_queue.clone(), &config.jobs)
                    .with_cancellation(shutdown.clone()),
            )
            .with_metrics(
                QueueMetricsJob::new(self.job_queue.clone(), &config.jobs)
                    .with_cancellation(shutdown),
            )
            .start()
            .await;
    }
}
