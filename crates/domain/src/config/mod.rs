//! Configuration module for AutoGuard
//!
//! Configuration structures organized by concern:
//! - `root`: Main configuration, CLI overrides, env overrides
//! - `server`: Gateway bind address, port, page root
//! - `database`: Primary store (SQLite) tuning
//! - `cache`: Shared cache (Redis) connection and TTLs
//! - `geoip`: GeoIP database paths
//! - `cloak`: Detector weights, threshold, decision deadline
//! - `log_queue`: Decision-log pipeline tuning
//! - `jobs`: Page-generation worker tuning
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod cache;
pub mod cloak;
pub mod database;
pub mod errors;
pub mod generator;
pub mod geoip;
pub mod jobs;
pub mod log_queue;
pub mod logging;
pub mod root;
pub mod server;

pub use cache::CacheConfig;
pub use cloak::{CloakConfig, DetectorWeights};
pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use generator::GeneratorConfig;
pub use geoip::GeoIpConfig;
pub use jobs::JobsConfig;
pub use log_queue::LogQueueConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
