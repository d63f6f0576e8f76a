pub mod blacklist_store;
pub mod decision_log;
pub mod ip_intelligence;
pub mod job_queue;
pub mod offer_repository;
pub mod page_generator;

pub use blacklist_store::BlacklistStore;
pub use decision_log::{DecisionLogQueue, DecisionLogRepository};
pub use ip_intelligence::IpIntelligencePort;
pub use job_queue::{JobQueue, PageRepository, QueueDepths};
pub use offer_repository::{OfferCache, OfferCacheKey, OfferRepository};
pub use page_generator::{GeneratedPage, PageGenerator, PageStore};
