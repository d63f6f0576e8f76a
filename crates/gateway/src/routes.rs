use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// The gateway router: reserved `/autoguard/*` endpoints for health and
/// admin, everything else falls through to the visit handler.
///
/// Without a front proxy the `/internal/pages/*` tree is served directly
/// from the page root, so the URL-to-file mapping (and asset loading)
/// stays identical to the X-Accel-Redirect deployment.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/autoguard/health", get(handlers::health_check))
        .route(
            "/autoguard/admin/blacklist/rebuild",
            post(handlers::rebuild_blacklist),
        )
        .route(
            "/autoguard/admin/offers/{offer_id}/invalidate",
            post(handlers::invalidate_offer),
        )
        .route(
            "/autoguard/admin/pages/generate",
            post(handlers::enqueue_page),
        )
        .route("/autoguard/admin/queues", get(handlers::get_queue_stats));

    if !state.accel_redirect {
        router = router.nest_service("/internal/pages", ServeDir::new(&state.page_root));
    }

    router
        .fallback(handlers::handle_visit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
