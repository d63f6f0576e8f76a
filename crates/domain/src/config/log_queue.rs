use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogQueueConfig {
    /// Maximum records moved into flight per drain cycle.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds the writer blocks waiting for the first record of a batch.
    /// Bounded so shutdown stays prompt.
    #[serde(default = "default_block_wait_secs")]
    pub block_wait_secs: u64,

    /// Seconds the writer sleeps after a failed batch insert before
    /// retrying.
    #[serde(default = "default_failure_backoff_secs")]
    pub failure_backoff_secs: u64,

    /// Interval for emitting cumulative writer counters.
    #[serde(default = "default_counter_interval_secs")]
    pub counter_interval_secs: u64,
}

impl Default for LogQueueConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            block_wait_secs: default_block_wait_secs(),
            failure_backoff_secs: default_failure_backoff_secs(),
            counter_interval_secs: default_counter_interval_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_block_wait_secs() -> u64 {
    2
}

fn default_failure_backoff_secs() -> u64 {
    1
}

fn default_counter_interval_secs() -> u64 {
    10
}
