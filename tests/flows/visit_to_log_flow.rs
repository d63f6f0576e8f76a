//! Full visit flow: request → gateway router → decision → internal
//! dispatch, then the log writer drains the queue into SQLite.

#[path = "../common/fixtures.rs"]
mod fixtures;

use autoguard_application::use_cases::{
    EnqueuePageJobUseCase, GetQueueStatsUseCase, HandleVisitUseCase, RebuildBlacklistUseCase,
    ResolveOfferUseCase,
};
use autoguard_application::DecisionEngine;
use autoguard_domain::config::{CloakConfig, LogQueueConfig};
use autoguard_gateway::{create_router, AppState};
use autoguard_infrastructure::SqliteDecisionLogRepository;
use autoguard_jobs::LogWriterJob;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use fixtures::*;
use sqlx::{Row, SqlitePool};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn decisions_table() -> SqlitePool {
    // One connection: every handle must see the same in-memory database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE cloak_decisions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            offer_id INTEGER NOT NULL,
            ip_address TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            referer TEXT,
            request_url TEXT NOT NULL,
            decision TEXT NOT NULL,
            decision_reason TEXT,
            fraud_score INTEGER NOT NULL,
            blocked_at_layer TEXT,
            detection_details TEXT NOT NULL DEFAULT '{}',
            ip_country TEXT,
            ip_city TEXT,
            ip_isp TEXT,
            ip_asn INTEGER,
            is_datacenter INTEGER NOT NULL DEFAULT 0,
            is_vpn INTEGER NOT NULL DEFAULT 0,
            is_proxy INTEGER NOT NULL DEFAULT 0,
            processing_time_ms INTEGER NOT NULL DEFAULT 0,
            has_tracking_params INTEGER NOT NULL DEFAULT 0,
            gclid TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool
}

fn state_with(log_queue: Arc<MemoryLogQueue>) -> AppState {
    let resolver = Arc::new(ResolveOfferUseCase::new(
        Arc::new(StaticOffers(vec![active_offer(1, "ab12cd")])),
        Arc::new(NoCache),
    ));
    let blacklist = Arc::new(NoHits);
    let engine = Arc::new(DecisionEngine::new(
        blacklist.clone(),
        Arc::new(StaticIntel(us_residential_intel())),
        Arc::new(CloakConfig::default()),
    ));
    let job_queue = Arc::new(MemoryJobQueue::default());

    AppState {
        handle_visit: Arc::new(HandleVisitUseCase::new(
            resolver.clone(),
            engine,
            log_queue.clone(),
        )),
        resolve_offer: resolver,
        rebuild_blacklist: Arc::new(RebuildBlacklistUseCase::new(blacklist)),
        enqueue_page_job: Arc::new(EnqueuePageJobUseCase::new(
            job_queue.clone(),
            Arc::new(NoopPages),
        )),
        queue_stats: Arc::new(GetQueueStatsUseCase::new(job_queue, log_queue)),
        page_root: std::env::temp_dir(),
        accel_redirect: true,
    }
}

struct NoopPages;

#[async_trait::async_trait]
impl autoguard_application::ports::PageRepository for NoopPages {
    async fn mark_generating(
        &self,
        _page_id: i64,
        _variant: autoguard_domain::Variant,
    ) -> Result<(), autoguard_domain::DomainError> {
        Ok(())
    }

    async fn mark_generated(
        &self,
        _page_id: i64,
        _variant: autoguard_domain::Variant,
    ) -> Result<(), autoguard_domain::DomainError> {
        Ok(())
    }

    async fn record_attempt_error(
        &self,
        _page_id: i64,
        _variant: autoguard_domain::Variant,
        _error: &str,
    ) -> Result<(), autoguard_domain::DomainError> {
        Ok(())
    }

    async fn mark_failed(
        &self,
        _page_id: i64,
        _variant: autoguard_domain::Variant,
        _error: &str,
    ) -> Result<(), autoguard_domain::DomainError> {
        Ok(())
    }
}

#[tokio::test]
async fn visit_is_dispatched_and_decision_reaches_sqlite() {
    // Arrange
    let log_queue = Arc::new(MemoryLogQueue::default());
    let router = create_router(state_with(log_queue.clone()));

    let pool = decisions_table().await;
    let shutdown = CancellationToken::new();
    let writer = LogWriterJob::new(
        log_queue.clone(),
        Arc::new(SqliteDecisionLogRepository::new(pool.clone())),
        &LogQueueConfig {
            batch_size: 10,
            block_wait_secs: 1,
            failure_backoff_secs: 0,
            counter_interval_secs: 60,
        },
    )
    .with_cancellation(shutdown.clone());
    Arc::new(writer).start().await;

    // Act - one clean visit
    let mut request = Request::builder()
        .uri("/?gclid=abc&utm_source=google")
        .header("x-subdomain", "ab12cd")
        .header("user-agent", CHROME_120)
        .header("referer", "https://google.com/")
        .header("cf-connecting-ip", "24.0.0.1")
        .body(Body::empty())
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 51000))));
    let response = router.oneshot(request).await.unwrap();

    // Assert - dispatch first
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-accel-redirect").unwrap(),
        "/internal/pages/ab12cd/a/index.html"
    );

    // ...then the record lands in the primary store at least once.
    let mut row_landed = false;
    for _ in 0..300 {
        let n: i64 = sqlx::query("SELECT COUNT(*) AS n FROM cloak_decisions")
            .fetch_one(&pool)
            .await
            .unwrap()
            .get("n");
        if n >= 1 {
            row_landed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(row_landed, "decision row never reached sqlite");

    let row = sqlx::query("SELECT * FROM cloak_decisions LIMIT 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("decision"), "money");
    assert_eq!(row.get::<String, _>("ip_address"), "24.0.0.1");
    assert_eq!(row.get::<Option<String>, _>("gclid").as_deref(), Some("abc"));
    assert_eq!(row.get::<i64, _>("has_tracking_params"), 1);
    assert_eq!(row.get::<Option<String>, _>("blocked_at_layer"), None);
    assert_eq!(row.get::<String, _>("ip_country"), "US");

    // Queue fully drained: nothing pending, nothing stuck in flight.
    assert!(wait_for(|| log_queue.depth() == 0, Duration::from_secs(2)).await);

    shutdown.cancel();
}
