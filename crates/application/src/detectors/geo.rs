use super::{DetectionContext, Detector};
use async_trait::async_trait;
use autoguard_domain::{DetectorOutcome, DomainError, Layer, VisitRequest};
use serde_json::json;

/// Countries with a consistently elevated share of click-farm and proxy
/// traffic in the decision logs. Membership deducts, it never hard-blocks.
const HIGH_RISK_COUNTRIES: &[&str] = &["NG", "PK", "BD", "VN", "ID", "KH", "MM", "AF"];

const SCORE_UNKNOWN_NO_TARGETS: u8 = 80;
const DEDUCT_HIGH_RISK: u8 = 30;

/// L3 — geography. Matches the visitor's country against the offer's
/// target list.
pub struct GeoDetector;

impl GeoDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_high_risk(country: &str) -> bool {
        HIGH_RISK_COUNTRIES.contains(&country)
    }
}

impl Default for GeoDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for GeoDetector {
    fn layer(&self) -> Layer {
        Layer::L3
    }

    async fn detect(
        &self,
        _request: &VisitRequest,
        ctx: &DetectionContext,
    ) -> Result<DetectorOutcome, DomainError> {
        let country = ctx.intel().and_then(|i| i.country.as_deref());
        let targeting = !ctx.target_countries.is_empty();

        let outcome = match country {
            None if targeting => DetectorOutcome::fail("unknown location, targeting configured")
                .with_evidence(json!({
                    "country": null,
                    "targetingConfigured": true,
                    "isTargetRegion": false,
                })),
            None => DetectorOutcome::pass(SCORE_UNKNOWN_NO_TARGETS).with_evidence(json!({
                "country": null,
                "targetingConfigured": false,
            })),
            Some(country) => {
                if targeting && !ctx.target_countries.iter().any(|c| c == country) {
                    DetectorOutcome::fail(format!(
                        "country {country} not in target list"
                    ))
                    .with_evidence(json!({
                        "country": country,
                        "targetingConfigured": true,
                        "isTargetRegion": false,
                    }))
                } else if Self::is_high_risk(country) {
                    DetectorOutcome::pass(100 - DEDUCT_HIGH_RISK)
                        .with_reason(format!("high-risk country {country}"))
                        .with_evidence(json!({
                            "country": country,
                            "targetingConfigured": targeting,
                            "isTargetRegion": targeting,
                            "highRisk": true,
                        }))
                } else {
                    DetectorOutcome::pass(100).with_evidence(json!({
                        "country": country,
                        "targetingConfigured": targeting,
                        "isTargetRegion": targeting,
                        "highRisk": false,
                    }))
                }
            }
        };

        Ok(outcome)
    }
}
