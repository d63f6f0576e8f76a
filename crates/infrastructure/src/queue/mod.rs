//! Redis-backed queues.
//!
//! Queue keys live outside the `autoguard:` namespace; they are shared
//! wire contracts with the dashboard processes that enqueue into them.

pub mod job_queue;
pub mod log_queue;

pub use job_queue::RedisJobQueue;
pub use log_queue::RedisLogQueue;

/// Decision-log queue pair.
pub const LOG_QUEUE_KEY: &str = "queue:cloak_logs";
pub const LOG_PROCESSING_KEY: &str = "queue:cloak_logs:processing";

/// Page-generation queue quartet.
pub const JOB_QUEUE_KEY: &str = "queue:page_generation";
pub const JOB_PROCESSING_KEY: &str = "queue:page_generation:processing";
pub const JOB_DELAYED_KEY: &str = "queue:page_generation:delayed";
pub const JOB_DEAD_KEY: &str = "queue:page_generation:dead";
