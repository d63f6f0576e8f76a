use autoguard_domain::{JobAction, PageGenerationJob, Variant};
use serde::{Deserialize, Serialize};

/// Request body for `POST /autoguard/admin/pages/generate`. Snake_case,
/// mirroring the queue wire format.
#[derive(Debug, Deserialize)]
pub struct EnqueuePageRequest {
    pub page_id: i64,
    pub offer_id: i64,
    pub variant: Variant,
    pub action: JobAction,
    pub source_url: String,
    pub subdomain: String,
    #[serde(default)]
    pub safe_page_style: Option<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl From<EnqueuePageRequest> for PageGenerationJob {
    fn from(request: EnqueuePageRequest) -> Self {
        PageGenerationJob {
            page_id: request.page_id,
            offer_id: request.offer_id,
            variant: request.variant,
            action: request.action,
            source_url: request.source_url,
            subdomain: request.subdomain,
            safe_page_style: request.safe_page_style,
            competitors: request.competitors,
            attempt: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

#[derive(Debug, Serialize)]
pub struct QueueStatsResponse {
    pub jobs_pending: u64,
    pub jobs_processing: u64,
    pub jobs_delayed: u64,
    pub jobs_dead: u64,
    pub logs_pending: u64,
}
