use autoguard_application::use_cases::{
    EnqueuePageJobUseCase, GetQueueStatsUseCase, HandleVisitUseCase, RebuildBlacklistUseCase,
    ResolveOfferUseCase,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub handle_visit: Arc<HandleVisitUseCase>,
    pub resolve_offer: Arc<ResolveOfferUseCase>,
    pub rebuild_blacklist: Arc<RebuildBlacklistUseCase>,
    pub enqueue_page_job: Arc<EnqueuePageJobUseCase>,
    pub queue_stats: Arc<GetQueueStatsUseCase>,
    /// Root of the generated static pages, used by the inline-streaming
    /// fallback when no front proxy interprets X-Accel-Redirect.
    pub page_root: PathBuf,
    pub accel_redirect: bool,
}
