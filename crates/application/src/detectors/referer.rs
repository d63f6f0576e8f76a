use super::{credit, deduct, DetectionContext, Detector};
use async_trait::async_trait;
use autoguard_domain::{DetectorOutcome, DomainError, Layer, TrackingParams, VisitRequest};
use serde_json::json;

const DEDUCT_MISSING_REFERER: i32 = 20;
const DEDUCT_SUSPICIOUS_REFERER: i32 = 40;
const CREDIT_GCLID: i32 = 15;
const CREDIT_OTHER_CLICK_ID: i32 = 10;
const CREDIT_UTM_SOURCE: i32 = 5;

/// L5 — referer and tracking parameters.
///
/// This layer never hard-blocks: its score always joins the aggregate and
/// the pass flag is advisory only.
pub struct RefererDetector;

impl RefererDetector {
    pub fn new() -> Self {
        Self
    }

    fn referer_host(referer: &str) -> Option<String> {
        let rest = referer
            .strip_prefix("https://")
            .or_else(|| referer.strip_prefix("http://"))?;
        let host = rest.split(['/', '?', '#']).next()?;
        let host = host.split('@').next_back()?.split(':').next()?;
        Some(host.to_ascii_lowercase())
    }

    fn is_suspicious_referer(host: &str, domains: &[String]) -> bool {
        domains.iter().any(|d| {
            let d = d.to_ascii_lowercase();
            host == d || host.ends_with(&format!(".{d}"))
        })
    }
}

impl Default for RefererDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for RefererDetector {
    fn layer(&self) -> Layer {
        Layer::L5
    }

    async fn detect(
        &self,
        request: &VisitRequest,
        ctx: &DetectionContext,
    ) -> Result<DetectorOutcome, DomainError> {
        let tracking = TrackingParams::extract(&request.url);
        let mut score: i32 = 100;
        let mut reasons: Vec<String> = Vec::new();

        let referer_host = request
            .referer
            .as_deref()
            .and_then(Self::referer_host);

        match &referer_host {
            None if ctx.policy.require_referer => {
                deduct(&mut score, DEDUCT_MISSING_REFERER);
                reasons.push("missing referer".to_string());
            }
            Some(host)
                if Self::is_suspicious_referer(host, &ctx.policy.suspicious_referer_domains) =>
            {
                deduct(&mut score, DEDUCT_SUSPICIOUS_REFERER);
                reasons.push(format!("suspicious referer {host}"));
            }
            _ => {}
        }

        if tracking.gclid().is_some() {
            credit(&mut score, CREDIT_GCLID);
        }
        if tracking.get("fbclid").is_some() || tracking.get("msclkid").is_some() {
            credit(&mut score, CREDIT_OTHER_CLICK_ID);
        }
        if tracking.get("utm_source").is_some() {
            credit(&mut score, CREDIT_UTM_SOURCE);
        }

        let params: serde_json::Map<String, serde_json::Value> = tracking
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        let evidence = json!({
            "refererHost": referer_host,
            "trackingParams": params,
            "hasAdClickId": tracking.has_ad_click_id(),
        });

        let score = score.clamp(0, 100) as u8;
        // Advisory flag only: even at 0 this layer never short-circuits.
        let mut outcome = DetectorOutcome {
            passed: score > 0,
            score,
            reason: None,
            evidence: serde_json::Value::Null,
        };
        if !reasons.is_empty() {
            outcome = outcome.with_reason(reasons.join("; "));
        }
        Ok(outcome.with_evidence(evidence))
    }
}
