//! AutoGuard background jobs: the decision-log writer, the page-generation
//! worker, the delayed-job mover and the queue metrics sampler.
pub mod backoff;
pub mod delayed_mover;
pub mod log_writer;
pub mod metrics;
pub mod page_worker;
pub mod runner;

pub use delayed_mover::DelayedMoverJob;
pub use log_writer::LogWriterJob;
pub use metrics::QueueMetricsJob;
pub use page_worker::PageWorkerJob;
pub use runner::JobRunner;
