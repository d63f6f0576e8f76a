pub mod decision_log_repository;
pub mod offer_repository;
pub mod page_repository;

pub use decision_log_repository::SqliteDecisionLogRepository;
pub use offer_repository::{RedisOfferCache, SqliteOfferRepository};
pub use page_repository::SqlitePageRepository;
