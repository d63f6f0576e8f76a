//! AutoGuard Infrastructure Layer
//!
//! Concrete adapters behind the application ports: SQLite primary store,
//! Redis shared cache and queues, GeoIP databases, the blacklist
//! projection, the static page store, and the external page-generator
//! client.
pub mod blacklist;
pub mod cache;
pub mod database;
pub mod generator;
pub mod geoip;
pub mod pages;
pub mod queue;
pub mod repositories;

pub use blacklist::RedisBlacklistStore;
pub use cache::SharedCache;
pub use generator::HttpPageGenerator;
pub use geoip::{CachedIpIntelligence, GeoIpService};
pub use pages::FileSystemPageStore;
pub use queue::{RedisJobQueue, RedisLogQueue};
pub use repositories::{
    RedisOfferCache, SqliteDecisionLogRepository, SqliteOfferRepository, SqlitePageRepository,
};
