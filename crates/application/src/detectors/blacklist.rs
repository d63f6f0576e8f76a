use super::{DetectionContext, Detector};
use crate::ports::BlacklistStore;
use async_trait::async_trait;
use autoguard_domain::{BlacklistHit, DetectorOutcome, DomainError, Layer, VisitRequest};
use serde_json::json;
use std::sync::Arc;

/// L1 — static blacklist. A hit in any kind is a hard block.
///
/// Evaluation order is fixed: exact IP, CIDR, user agent, ISP, geo. The ISP
/// and geo checks need the shared IP-intelligence result and are skipped
/// when it is absent.
pub struct BlacklistDetector {
    store: Arc<dyn BlacklistStore>,
}

impl BlacklistDetector {
    pub fn new(store: Arc<dyn BlacklistStore>) -> Self {
        Self { store }
    }

    fn hit_outcome(hit: BlacklistHit) -> DetectorOutcome {
        let reason = format!(
            "blacklist {} match: {} ({})",
            hit.kind,
            hit.value,
            hit.scope.as_str()
        );
        DetectorOutcome::fail(reason).with_evidence(json!({
            "matchedKind": hit.kind,
            "matchedValue": hit.value,
            "scope": hit.scope.as_str(),
        }))
    }
}

#[async_trait]
impl Detector for BlacklistDetector {
    fn layer(&self) -> Layer {
        Layer::L1
    }

    async fn detect(
        &self,
        request: &VisitRequest,
        ctx: &DetectionContext,
    ) -> Result<DetectorOutcome, DomainError> {
        let tenant = ctx.user_id;

        if let Some(hit) = self.store.is_ip_blocked(request.ip, tenant).await? {
            return Ok(Self::hit_outcome(hit));
        }

        if let Some(hit) = self.store.is_cidr_hit(request.ip, tenant).await? {
            return Ok(Self::hit_outcome(hit));
        }

        if let Some(hit) = self
            .store
            .is_ua_blocked(&request.user_agent, tenant)
            .await?
        {
            return Ok(Self::hit_outcome(hit));
        }

        if let Some(intel) = ctx.intel() {
            if let Some(hit) = self
                .store
                .is_isp_blocked(intel.asn, intel.organization.as_deref(), tenant)
                .await?
            {
                return Ok(Self::hit_outcome(hit));
            }

            if let Some(hit) = self
                .store
                .is_geo_blocked(intel.country.as_deref(), intel.region.as_deref(), tenant)
                .await?
            {
                return Ok(Self::hit_outcome(hit));
            }
        }

        Ok(DetectorOutcome::pass(100).with_evidence(json!({ "matched": false })))
    }
}
