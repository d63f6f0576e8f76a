pub mod admin;
pub mod health;
pub mod visit;

pub use admin::{enqueue_page, get_queue_stats, invalidate_offer, rebuild_blacklist};
pub use health::health_check;
pub use visit::handle_visit;
