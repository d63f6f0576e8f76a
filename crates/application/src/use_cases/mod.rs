pub mod enqueue_page_job;
pub mod handle_visit;
pub mod queue_stats;
pub mod rebuild_blacklist;
pub mod resolve_offer;

pub use enqueue_page_job::EnqueuePageJobUseCase;
pub use handle_visit::{HandleVisitUseCase, OfferRoute, VisitOutcome};
pub use queue_stats::{GetQueueStatsUseCase, QueueStats};
pub use rebuild_blacklist::RebuildBlacklistUseCase;
pub use resolve_offer::ResolveOfferUseCase;
