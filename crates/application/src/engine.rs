use crate::detectors::{
    BlacklistDetector, DetectionContext, Detector, GeoDetector, IpReputationDetector,
    RefererDetector, UserAgentDetector,
};
use crate::ports::{BlacklistStore, IpIntelligencePort};
use autoguard_domain::config::CloakConfig;
use autoguard_domain::{
    CloakDecision, Decision, DetectorOutcome, DomainError, IpIntelligence, Layer, Offer,
    TrackingParams, VisitRequest,
};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// What one decision hands back to the gateway: the record itself plus the
/// shared lookups the log record is composed from.
pub struct DecisionOutput {
    pub decision: CloakDecision,
    pub intel: Option<IpIntelligence>,
    pub tracking: TrackingParams,
}

struct PipelineResult {
    decision: Decision,
    score: u8,
    blocked_at: Option<Layer>,
    reason: Option<String>,
    evidence: serde_json::Map<String, serde_json::Value>,
    intel: IpIntelligence,
}

/// Orchestrates detectors L1-L5 under a hard wall-clock deadline.
///
/// The deadline races the whole pipeline; on expiry partial results are
/// discarded and a fail-closed Safe decision is emitted with the synthetic
/// TIMEOUT layer. The timeout is a value, never an error: callers always
/// receive a decision.
pub struct DecisionEngine {
    l1: BlacklistDetector,
    l2: IpReputationDetector,
    l3: GeoDetector,
    l4: UserAgentDetector,
    l5: RefererDetector,
    intel_port: Arc<dyn IpIntelligencePort>,
    policy: Arc<CloakConfig>,
}

impl DecisionEngine {
    pub fn new(
        blacklist: Arc<dyn BlacklistStore>,
        intel_port: Arc<dyn IpIntelligencePort>,
        policy: Arc<CloakConfig>,
    ) -> Self {
        Self {
            l1: BlacklistDetector::new(blacklist),
            l2: IpReputationDetector::new(),
            l3: GeoDetector::new(),
            l4: UserAgentDetector::new(),
            l5: RefererDetector::new(),
            intel_port,
            policy,
        }
    }

    /// Decide Money vs Safe for one visit. Never fails and never exceeds
    /// the configured deadline by more than scheduler noise.
    pub async fn decide(&self, request: &VisitRequest, offer: &Offer) -> DecisionOutput {
        let started = Instant::now();
        let cancel = CancellationToken::new();
        let deadline = Duration::from_millis(self.policy.decision_timeout_ms);
        let tracking = TrackingParams::extract(&request.url);

        let pipeline = AssertUnwindSafe(self.run_pipeline(request, offer, cancel.clone()))
            .catch_unwind();

        let (decision, intel) = match tokio::time::timeout(deadline, pipeline).await {
            Ok(Ok(Ok(result))) => {
                let decision = CloakDecision {
                    decision: result.decision,
                    score: result.score,
                    blocked_at: result.blocked_at,
                    reason: result.reason,
                    evidence: result.evidence,
                    processing_time_ms: started.elapsed().as_millis() as u64,
                    offer_id: offer.id,
                    user_id: offer.user_id,
                    fingerprint: request.clone(),
                    created_at: Utc::now(),
                };
                (decision, Some(result.intel))
            }
            Ok(Ok(Err(e))) => {
                error!(error = %e, offer_id = offer.id, "Detector pipeline failed");
                let mut decision =
                    CloakDecision::safe(offer.id, offer.user_id, request.clone(), None, "internal");
                decision.processing_time_ms = started.elapsed().as_millis() as u64;
                (decision, None)
            }
            Ok(Err(_panic)) => {
                error!(offer_id = offer.id, "Detector pipeline panicked");
                let mut decision =
                    CloakDecision::safe(offer.id, offer.user_id, request.clone(), None, "internal");
                decision.processing_time_ms = started.elapsed().as_millis() as u64;
                (decision, None)
            }
            Err(_elapsed) => {
                cancel.cancel();
                warn!(
                    offer_id = offer.id,
                    deadline_ms = self.policy.decision_timeout_ms,
                    "Decision deadline exceeded, failing closed"
                );
                let mut decision = CloakDecision::safe(
                    offer.id,
                    offer.user_id,
                    request.clone(),
                    Some(Layer::Timeout),
                    "deadline",
                );
                decision.processing_time_ms = started.elapsed().as_millis() as u64;
                (decision, None)
            }
        };

        DecisionOutput {
            decision,
            intel,
            tracking,
        }
    }

    async fn run_pipeline(
        &self,
        request: &VisitRequest,
        offer: &Offer,
        cancel: CancellationToken,
    ) -> Result<PipelineResult, DomainError> {
        // One IP-intelligence call per request, shared by every layer.
        let intel = self.intel_port.lookup(request.ip, &cancel).await;

        let ctx = DetectionContext {
            offer_id: offer.id,
            user_id: offer.user_id,
            target_countries: Arc::new(offer.target_countries.clone()),
            cloak_enabled: offer.cloak_enabled,
            policy: Arc::clone(&self.policy),
            intel: Some(intel.clone()),
            cancel,
        };

        let weights = &self.policy.weights;
        let mut evidence = serde_json::Map::new();
        let mut scored: Vec<(u8, u32)> = Vec::with_capacity(5);

        // L1 short-circuits on any hit, independent of its weight.
        let l1 = self.l1.detect(request, &ctx).await?;
        record(&mut evidence, Layer::L1, &l1);
        if l1.is_hard_fail() {
            debug!(offer_id = offer.id, "L1 blacklist hit");
            return Ok(PipelineResult {
                decision: Decision::Safe,
                score: 0,
                blocked_at: Some(Layer::L1),
                reason: l1.reason,
                evidence,
                intel,
            });
        }
        if weights.l1 > 0 {
            scored.push((l1.score, weights.l1));
        }

        // L2-L4: skipped entirely at weight zero; a hard fail from a
        // weighted layer short-circuits.
        let middle: [(&dyn Detector, u32, Layer); 3] = [
            (&self.l2, weights.l2, Layer::L2),
            (&self.l3, weights.l3, Layer::L3),
            (&self.l4, weights.l4, Layer::L4),
        ];
        for (detector, weight, layer) in middle {
            if weight == 0 {
                continue;
            }
            if ctx.cancel.is_cancelled() {
                return Err(DomainError::DecisionTimeout);
            }
            let outcome = detector.detect(request, &ctx).await?;
            record(&mut evidence, layer, &outcome);
            if outcome.is_hard_fail() {
                debug!(offer_id = offer.id, layer = layer.as_str(), "Hard block");
                return Ok(PipelineResult {
                    decision: Decision::Safe,
                    score: 0,
                    blocked_at: Some(layer),
                    reason: outcome.reason,
                    evidence,
                    intel,
                });
            }
            scored.push((outcome.score, weight));
        }

        // L5 always runs and never short-circuits, even at score zero.
        let l5 = self.l5.detect(request, &ctx).await?;
        record(&mut evidence, Layer::L5, &l5);
        if weights.l5 > 0 {
            scored.push((l5.score, weights.l5));
        }

        let score = weighted_score(&scored);
        let (decision, reason) = if score < self.policy.safe_mode_threshold {
            (
                Decision::Safe,
                Some(format!(
                    "score {score} below threshold {}",
                    self.policy.safe_mode_threshold
                )),
            )
        } else {
            (Decision::Money, None)
        };

        Ok(PipelineResult {
            decision,
            score,
            blocked_at: None,
            reason,
            evidence,
            intel,
        })
    }
}

fn record(
    evidence: &mut serde_json::Map<String, serde_json::Value>,
    layer: Layer,
    outcome: &DetectorOutcome,
) {
    evidence.insert(
        layer.as_str().to_string(),
        serde_json::json!({
            "passed": outcome.passed,
            "score": outcome.score,
            "reason": outcome.reason,
            "evidence": outcome.evidence,
        }),
    );
}

/// `round(Σ weight·score / Σ weight)` over the layers that actually ran
/// with non-zero weight.
fn weighted_score(scored: &[(u8, u32)]) -> u8 {
    let total: u64 = scored.iter().map(|(_, w)| u64::from(*w)).sum();
    if total == 0 {
        return 0;
    }
    let sum: u64 = scored
        .iter()
        .map(|(s, w)| u64::from(*s) * u64::from(*w))
        .sum();
    // Round half up in integer arithmetic.
    ((sum + total / 2) / total).min(100) as u8
}
