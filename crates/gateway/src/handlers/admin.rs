use crate::dto::{EnqueuePageRequest, QueueStatsResponse, StatusResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    error!(error = %e, "Admin operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}

pub async fn rebuild_blacklist(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    state
        .rebuild_blacklist
        .execute()
        .await
        .map_err(internal_error)?;
    Ok(Json(StatusResponse::ok()))
}

/// Invalidate all cached routing keys of one offer. Called by the
/// dashboard after any write touching target countries, the custom-domain
/// state or the cloak flag.
pub async fn invalidate_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<i64>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    let offer = state
        .resolve_offer
        .by_id(offer_id)
        .await
        .map_err(internal_error)?;

    match offer {
        Some(offer) => {
            state.resolve_offer.invalidate(&offer).await;
            Ok(Json(StatusResponse::ok()))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "offer not found" })),
        )),
    }
}

pub async fn enqueue_page(
    State(state): State<AppState>,
    Json(request): Json<EnqueuePageRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), (StatusCode, Json<serde_json::Value>)> {
    state
        .enqueue_page_job
        .execute(request.into())
        .await
        .map_err(internal_error)?;
    Ok((StatusCode::ACCEPTED, Json(StatusResponse::ok())))
}

pub async fn get_queue_stats(
    State(state): State<AppState>,
) -> Result<Json<QueueStatsResponse>, (StatusCode, Json<serde_json::Value>)> {
    let stats = state.queue_stats.execute().await.map_err(internal_error)?;
    Ok(Json(QueueStatsResponse {
        jobs_pending: stats.jobs.pending,
        jobs_processing: stats.jobs.processing,
        jobs_delayed: stats.jobs.delayed,
        jobs_dead: stats.jobs.dead,
        logs_pending: stats.log_pending,
    }))
}
