use autoguard_domain::config::JobsConfig;
use std::time::Duration;

/// Retry delay for a job that has already failed `attempt + 1` times:
/// `min(retry_max_ms, retry_base_ms * 2^attempt)` with uniform jitter of
/// `retry_jitter` applied in both directions.
pub fn retry_delay(cfg: &JobsConfig, attempt: u32) -> Duration {
    let shift = attempt.min(20);
    let exponential = cfg.retry_base_ms.saturating_mul(1u64 << shift);
    let capped = exponential.min(cfg.retry_max_ms);

    let jitter = cfg.retry_jitter.clamp(0.0, 1.0);
    let factor = if jitter > 0.0 {
        1.0 + jitter * (fastrand::f64() * 2.0 - 1.0)
    } else {
        1.0
    };

    Duration::from_millis((capped as f64 * factor).round().max(0.0) as u64)
}
