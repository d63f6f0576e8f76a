use super::{credit, deduct, DetectionContext, Detector};
use async_trait::async_trait;
use autoguard_domain::{DetectorOutcome, DomainError, Layer, VisitRequest};
use serde_json::json;

const DEDUCT_DATACENTER_OR_HOSTING: i32 = 40;
const DEDUCT_VPN: i32 = 30;
const DEDUCT_PROXY: i32 = 30;
const DEDUCT_TOR: i32 = 50;
const DEDUCT_DATACENTER_ASN: i32 = 20;
const CREDIT_RESIDENTIAL: i32 = 10;

/// L2 — IP intelligence. Starts at 100 and deducts per anonymity or
/// hosting signal; a residential signal earns a small credit.
pub struct IpReputationDetector;

impl IpReputationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IpReputationDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn threat_level(score: i32) -> &'static str {
    match score {
        70.. => "low",
        40..=69 => "medium",
        _ => "high",
    }
}

#[async_trait]
impl Detector for IpReputationDetector {
    fn layer(&self) -> Layer {
        Layer::L2
    }

    async fn detect(
        &self,
        _request: &VisitRequest,
        ctx: &DetectionContext,
    ) -> Result<DetectorOutcome, DomainError> {
        let intel = match ctx.intel() {
            Some(intel) => intel,
            // No intelligence at all: nothing to deduct for.
            None => {
                return Ok(DetectorOutcome::pass(100).with_evidence(json!({
                    "available": false,
                    "threatLevel": "low",
                })))
            }
        };

        let mut score: i32 = 100;
        let mut signals: Vec<&'static str> = Vec::new();

        // One line item: the Anonymous-IP hosting flag also raises
        // is_datacenter, and the two must never stack.
        if intel.is_datacenter || intel.is_hosting {
            deduct(&mut score, DEDUCT_DATACENTER_OR_HOSTING);
            signals.push("datacenter");
        }
        if intel.is_vpn {
            deduct(&mut score, DEDUCT_VPN);
            signals.push("vpn");
        }
        if intel.is_proxy {
            deduct(&mut score, DEDUCT_PROXY);
            signals.push("proxy");
        }
        if intel.is_tor {
            deduct(&mut score, DEDUCT_TOR);
            signals.push("tor");
        }
        if let Some(asn) = intel.asn {
            if ctx.policy.datacenter_asns.contains(&asn) {
                deduct(&mut score, DEDUCT_DATACENTER_ASN);
                signals.push("datacenter_asn");
            }
        }
        if intel.is_residential {
            credit(&mut score, CREDIT_RESIDENTIAL);
        }

        let score = score.clamp(0, 100) as u8;
        let evidence = json!({
            "available": true,
            "isDatacenter": intel.is_datacenter,
            "isHosting": intel.is_hosting,
            "isVpn": intel.is_vpn,
            "isProxy": intel.is_proxy,
            "isTor": intel.is_tor,
            "isResidential": intel.is_residential,
            "asn": intel.asn,
            "organization": intel.organization,
            "connectionType": intel.connection_type.as_str(),
            "signals": signals,
            "threatLevel": threat_level(score as i32),
        });

        let mut outcome = if score == 0 {
            DetectorOutcome::fail("ip reputation exhausted")
        } else {
            DetectorOutcome::pass(score)
        };
        if !signals.is_empty() && score > 0 {
            outcome = outcome.with_reason(format!("ip signals: {}", signals.join(", ")));
        }
        Ok(outcome.with_evidence(evidence))
    }
}
