pub mod cache;
pub mod config;
pub mod database;
pub mod geoip;
pub mod logging;

pub use cache::init_cache;
pub use config::load_config;
pub use database::init_database;
pub use geoip::init_geoip;
pub use logging::init_logging;
