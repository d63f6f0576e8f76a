use super::{
    CacheConfig, CloakConfig, ConfigError, DatabaseConfig, GeneratorConfig, GeoIpConfig,
    JobsConfig, LogQueueConfig, LoggingConfig, ServerConfig,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Overrides supplied on the command line. They win over both the config
/// file and the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub gateway_port: Option<u16>,
    pub bind_address: Option<String>,
    pub database_path: Option<String>,
    pub redis_url: Option<String>,
    pub page_root: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub cloak: CloakConfig,
    #[serde(default)]
    pub log_queue: LogQueueConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration: TOML file (optional) → `AUTOGUARD_*` environment
    /// overrides → CLI overrides, later layers winning.
    pub fn load(path: Option<&str>, cli: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadError {
                    path: p.to_string(),
                    source: e,
                })?;
                toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
                    path: p.to_string(),
                    message: e.to_string(),
                })?
            }
            None => Config::default(),
        };

        config.apply_env_overrides()?;
        config.apply_cli_overrides(cli);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_var("AUTOGUARD_DATABASE_PATH") {
            self.database.path = v;
        }
        if let Some(v) = env_var("AUTOGUARD_REDIS_URL") {
            self.cache.redis_url = v;
        }
        if let Some(v) = env_var("AUTOGUARD_GEOIP_CITY_DB") {
            self.geoip.city_db_path = v;
        }
        if let Some(v) = env_var("AUTOGUARD_GEOIP_ASN_DB") {
            self.geoip.asn_db_path = v;
        }
        if let Some(v) = env_var("AUTOGUARD_GEOIP_ANON_DB") {
            self.geoip.anonymous_db_path = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_LOG_BATCH_SIZE")? {
            self.log_queue.batch_size = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_LOG_FLUSH_WAIT_SECS")? {
            self.log_queue.block_wait_secs = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_JOB_POLL_TIMEOUT_SECS")? {
            self.jobs.poll_timeout_secs = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_MAX_CONCURRENT_JOBS")? {
            self.jobs.max_concurrent = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_MAX_JOB_ATTEMPTS")? {
            self.jobs.max_attempts = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_RETRY_BASE_MS")? {
            self.jobs.retry_base_ms = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_RETRY_MAX_MS")? {
            self.jobs.retry_max_ms = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_RETRY_JITTER")? {
            self.jobs.retry_jitter = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_DECISION_TIMEOUT_MS")? {
            self.cloak.decision_timeout_ms = v;
        }
        if let Some(v) = parse_env("AUTOGUARD_SAFE_MODE_THRESHOLD")? {
            self.cloak.safe_mode_threshold = v;
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.gateway_port {
            self.server.gateway_port = port;
        }
        if let Some(bind) = cli.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(path) = cli.database_path {
            self.database.path = path;
        }
        if let Some(url) = cli.redis_url {
            self.cache.redis_url = url;
        }
        if let Some(root) = cli.page_root {
            self.server.page_root = root;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloak.safe_mode_threshold > 100 {
            return Err(ConfigError::Validation(
                "cloak.safe_mode_threshold must be 0-100".to_string(),
            ));
        }
        if self.cloak.decision_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "cloak.decision_timeout_ms must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jobs.retry_jitter) {
            return Err(ConfigError::Validation(
                "jobs.retry_jitter must be within 0.0-1.0".to_string(),
            ));
        }
        if self.jobs.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "jobs.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.jobs.max_concurrent == 0 {
            return Err(ConfigError::Validation(
                "jobs.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.log_queue.batch_size == 0 {
            return Err(ConfigError::Validation(
                "log_queue.batch_size must be at least 1".to_string(),
            ));
        }
        if !self.cache.key_prefix.ends_with(':') {
            return Err(ConfigError::Validation(
                "cache.key_prefix must end with ':'".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvOverride {
                var: name.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}
