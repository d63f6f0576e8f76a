//! Detection layers L1-L5.
//!
//! Each layer is independent and side-effect free: it reads the request
//! fingerprint and the shared context, and returns a pass flag, a 0-100
//! trust score (100 = clearly human) and structured evidence. Hard-fail
//! semantics (`passed == false && score == 0`) apply to L1-L4 only; L5 is
//! always advisory.

pub mod blacklist;
pub mod geo;
pub mod ip_reputation;
pub mod referer;
pub mod user_agent;

pub use blacklist::BlacklistDetector;
pub use geo::GeoDetector;
pub use ip_reputation::IpReputationDetector;
pub use referer::RefererDetector;
pub use user_agent::UserAgentDetector;

use async_trait::async_trait;
use autoguard_domain::config::CloakConfig;
use autoguard_domain::{DetectorOutcome, DomainError, IpIntelligence, Layer, VisitRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state for one decision. Built by the engine before the first
/// layer runs; the IP-intelligence result is resolved once and shared by
/// every layer that needs it.
#[derive(Clone)]
pub struct DetectionContext {
    pub offer_id: i64,
    pub user_id: i64,
    pub target_countries: Arc<Vec<String>>,
    pub cloak_enabled: bool,
    pub policy: Arc<CloakConfig>,
    pub intel: Option<IpIntelligence>,
    pub cancel: CancellationToken,
}

impl DetectionContext {
    pub fn intel(&self) -> Option<&IpIntelligence> {
        self.intel.as_ref()
    }
}

#[async_trait]
pub trait Detector: Send + Sync {
    fn layer(&self) -> Layer;

    async fn detect(
        &self,
        request: &VisitRequest,
        ctx: &DetectionContext,
    ) -> Result<DetectorOutcome, DomainError>;
}

/// Subtract a deduction from a running score, saturating at zero.
#[inline]
pub(crate) fn deduct(score: &mut i32, amount: i32) {
    *score = (*score - amount).max(0);
}

/// Add a bonus to a running score, capping at 100.
#[inline]
pub(crate) fn credit(score: &mut i32, amount: i32) {
    *score = (*score + amount).min(100);
}
