use crate::ip_intelligence::IpIntelligence;
use crate::tracking::TrackingParams;
use crate::visit::VisitRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The final verdict: which page variant the visitor is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Money,
    Safe,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Money => "money",
            Decision::Safe => "safe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "money" => Some(Decision::Money),
            "safe" => Some(Decision::Safe),
            _ => None,
        }
    }
}

/// Detection layers, in evaluation order. `Timeout` is the synthetic layer
/// recorded when the decision deadline expires before the pipeline finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    L1,
    L2,
    L3,
    L4,
    L5,
    #[serde(rename = "TIMEOUT")]
    Timeout,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::L1 => "L1",
            Layer::L2 => "L2",
            Layer::L3 => "L3",
            Layer::L4 => "L4",
            Layer::L5 => "L5",
            Layer::Timeout => "TIMEOUT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "L1" => Some(Layer::L1),
            "L2" => Some(Layer::L2),
            "L3" => Some(Layer::L3),
            "L4" => Some(Layer::L4),
            "L5" => Some(Layer::L5),
            "TIMEOUT" => Some(Layer::Timeout),
            _ => None,
        }
    }
}

/// What a single detector returns. Scores run 0-100 with 100 = most trusted.
///
/// `passed == false && score == 0` is the hard-fail signal for L1-L4;
/// L5's flag is advisory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorOutcome {
    pub passed: bool,
    pub score: u8,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub evidence: Value,
}

impl DetectorOutcome {
    pub fn pass(score: u8) -> Self {
        Self {
            passed: true,
            score: score.min(100),
            reason: None,
            evidence: Value::Null,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            score: 0,
            reason: Some(reason.into()),
            evidence: Value::Null,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_evidence(mut self, evidence: Value) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn is_hard_fail(&self) -> bool {
        !self.passed && self.score == 0
    }
}

/// The immutable per-request decision record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloakDecision {
    pub decision: Decision,
    /// Final weighted trust score, 0-100 (100 = most trusted).
    pub score: u8,
    pub blocked_at: Option<Layer>,
    pub reason: Option<String>,
    /// Per-layer evidence, keyed "L1".."L5".
    pub evidence: serde_json::Map<String, Value>,
    pub processing_time_ms: u64,
    pub offer_id: i64,
    pub user_id: i64,
    pub fingerprint: VisitRequest,
    pub created_at: DateTime<Utc>,
}

impl CloakDecision {
    /// Fail-closed Safe decision used for timeouts, internal errors, and
    /// cloak-disabled offers.
    pub fn safe(
        offer_id: i64,
        user_id: i64,
        fingerprint: VisitRequest,
        blocked_at: Option<Layer>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            decision: Decision::Safe,
            score: 0,
            blocked_at,
            reason: Some(reason.into()),
            evidence: serde_json::Map::new(),
            processing_time_ms: 0,
            offer_id,
            user_id,
            fingerprint,
            created_at: Utc::now(),
        }
    }

    pub fn is_money(&self) -> bool {
        self.decision == Decision::Money
    }
}

fn bool_flag(b: bool) -> u8 {
    u8::from(b)
}

/// The snake_case wire record enqueued to the log queue and persisted by the
/// log writer. Every field is present on the wire; nullable fields encode as
/// JSON null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionLogRecord {
    pub user_id: i64,
    pub offer_id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub referer: Option<String>,
    pub request_url: String,
    pub decision: Decision,
    pub decision_reason: Option<String>,
    /// 0-100, same scale as the decision score.
    pub fraud_score: u8,
    pub blocked_at_layer: Option<Layer>,
    pub detection_details: Value,
    pub ip_country: Option<String>,
    pub ip_city: Option<String>,
    pub ip_isp: Option<String>,
    pub ip_asn: Option<u32>,
    pub is_datacenter: u8,
    pub is_vpn: u8,
    pub is_proxy: u8,
    pub processing_time_ms: u64,
    pub has_tracking_params: u8,
    pub gclid: Option<String>,
    /// ISO-8601 UTC timestamp.
    pub created_at: String,
}

impl DecisionLogRecord {
    /// Compose the wire record from the decision, the shared IP-intelligence
    /// result, and the extracted tracking parameters.
    pub fn compose(
        decision: &CloakDecision,
        intel: Option<&IpIntelligence>,
        tracking: &TrackingParams,
    ) -> Self {
        Self {
            user_id: decision.user_id,
            offer_id: decision.offer_id,
            ip_address: decision.fingerprint.ip.to_string(),
            user_agent: decision.fingerprint.user_agent.clone(),
            referer: decision.fingerprint.referer.clone(),
            request_url: decision.fingerprint.url.clone(),
            decision: decision.decision,
            decision_reason: decision.reason.clone(),
            fraud_score: decision.score,
            blocked_at_layer: decision.blocked_at,
            detection_details: Value::Object(decision.evidence.clone()),
            ip_country: intel.and_then(|i| i.country.clone()),
            ip_city: intel.and_then(|i| i.city.clone()),
            ip_isp: intel.and_then(|i| i.organization.clone()),
            ip_asn: intel.and_then(|i| i.asn),
            is_datacenter: bool_flag(intel.is_some_and(|i| i.is_datacenter)),
            is_vpn: bool_flag(intel.is_some_and(|i| i.is_vpn)),
            is_proxy: bool_flag(intel.is_some_and(|i| i.is_proxy)),
            processing_time_ms: decision.processing_time_ms,
            has_tracking_params: bool_flag(!tracking.is_empty()),
            gclid: tracking.gclid().map(|s| s.to_string()),
            created_at: decision.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn fingerprint() -> VisitRequest {
        VisitRequest::new(
            IpAddr::V4(Ipv4Addr::new(24, 0, 0, 1)),
            "Mozilla/5.0",
            "/?gclid=abc",
        )
        .with_referer("https://google.com/")
        .with_host("ab12cd.autoguard.dev")
    }

    #[test]
    fn layer_wire_names() {
        assert_eq!(Layer::L1.as_str(), "L1");
        assert_eq!(Layer::Timeout.as_str(), "TIMEOUT");
        assert_eq!(Layer::from_str("TIMEOUT"), Some(Layer::Timeout));
        assert_eq!(
            serde_json::to_string(&Layer::Timeout).unwrap(),
            "\"TIMEOUT\""
        );
    }

    #[test]
    fn hard_fail_signal() {
        assert!(DetectorOutcome::fail("blocked").is_hard_fail());
        assert!(!DetectorOutcome::pass(0).is_hard_fail());
        assert!(!DetectorOutcome::pass(100).is_hard_fail());
    }

    #[test]
    fn pass_clamps_to_100() {
        assert_eq!(DetectorOutcome::pass(200).score, 100);
    }

    #[test]
    fn log_record_wire_shape() {
        let decision = CloakDecision::safe(7, 3, fingerprint(), Some(Layer::L4), "known bot");
        let tracking = TrackingParams::extract("/?gclid=abc");
        let record = DecisionLogRecord::compose(&decision, None, &tracking);

        let json = serde_json::to_value(&record).unwrap();
        // All fields present, nullable ones as explicit null.
        for key in [
            "user_id",
            "offer_id",
            "ip_address",
            "user_agent",
            "referer",
            "request_url",
            "decision",
            "decision_reason",
            "fraud_score",
            "blocked_at_layer",
            "detection_details",
            "ip_country",
            "ip_city",
            "ip_isp",
            "ip_asn",
            "is_datacenter",
            "is_vpn",
            "is_proxy",
            "processing_time_ms",
            "has_tracking_params",
            "gclid",
            "created_at",
        ] {
            assert!(json.get(key).is_some(), "missing wire field {key}");
        }
        assert_eq!(json["decision"], "safe");
        assert_eq!(json["blocked_at_layer"], "L4");
        assert_eq!(json["gclid"], "abc");
        assert_eq!(json["has_tracking_params"], 1);
        assert_eq!(json["ip_country"], Value::Null);
    }
}
