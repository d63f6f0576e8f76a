use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// Seconds the worker blocks on the queue waiting for a job.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// In-flight jobs per worker process.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Total attempts before a job is dead-lettered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Retry back-off: `min(retry_max_ms, retry_base_ms * 2^attempt)` with
    /// uniform jitter of `retry_jitter` applied in both directions.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Jitter ratio, 0.0-1.0. 0.2 means ±20%.
    #[serde(default = "default_retry_jitter")]
    pub retry_jitter: f64,

    /// Interval of the delayed-job mover.
    #[serde(default = "default_mover_interval_ms")]
    pub mover_interval_ms: u64,

    /// Maximum due jobs moved per mover tick.
    #[serde(default = "default_mover_batch")]
    pub mover_batch: usize,

    /// Interval of the queue-depth metrics sampler.
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,

    /// Seconds to wait for in-flight jobs during shutdown.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: default_poll_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            max_attempts: default_max_attempts(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
            retry_jitter: default_retry_jitter(),
            mover_interval_ms: default_mover_interval_ms(),
            mover_batch: default_mover_batch(),
            metrics_interval_secs: default_metrics_interval_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_poll_timeout_secs() -> u64 {
    5
}

fn default_max_concurrent() -> usize {
    2
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    2_000
}

fn default_retry_max_ms() -> u64 {
    60_000
}

fn default_retry_jitter() -> f64 {
    0.2
}

fn default_mover_interval_ms() -> u64 {
    1_000
}

fn default_mover_batch() -> usize {
    100
}

fn default_metrics_interval_secs() -> u64 {
    15
}

fn default_shutdown_grace_secs() -> u64 {
    30
}
