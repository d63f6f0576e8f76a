use serde::{Deserialize, Serialize};

/// Per-layer aggregation weights. A weight of zero removes the layer from
/// both scoring and short-circuit checks.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DetectorWeights {
    #[serde(default = "default_w_l1")]
    pub l1: u32,
    #[serde(default = "default_w_l2")]
    pub l2: u32,
    #[serde(default = "default_w_l3")]
    pub l3: u32,
    #[serde(default = "default_w_l4")]
    pub l4: u32,
    #[serde(default = "default_w_l5")]
    pub l5: u32,
}

impl Default for DetectorWeights {
    fn default() -> Self {
        Self {
            l1: default_w_l1(),
            l2: default_w_l2(),
            l3: default_w_l3(),
            l4: default_w_l4(),
            l5: default_w_l5(),
        }
    }
}

fn default_w_l1() -> u32 {
    20
}

fn default_w_l2() -> u32 {
    30
}

fn default_w_l3() -> u32 {
    15
}

fn default_w_l4() -> u32 {
    25
}

fn default_w_l5() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloakConfig {
    #[serde(default)]
    pub weights: DetectorWeights,

    /// Final scores below this are served the Safe variant.
    /// Scale: 0-100, 100 = most trusted.
    #[serde(default = "default_safe_mode_threshold")]
    pub safe_mode_threshold: u8,

    /// Wall-clock budget for one decision. On expiry the visitor gets the
    /// Safe variant (fail-closed).
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,

    /// Hard-fail L4 on any known-bot keyword hit.
    #[serde(default = "default_true")]
    pub block_known_bots: bool,

    /// Deduct in L5 when the referer header is absent.
    #[serde(default)]
    pub require_referer: bool,

    /// Referer domains that indicate review/audit traffic.
    #[serde(default)]
    pub suspicious_referer_domains: Vec<String>,

    /// ASNs treated as known datacenters in L2 (beyond what the GeoIP
    /// databases report).
    #[serde(default = "default_datacenter_asns")]
    pub datacenter_asns: Vec<u32>,
}

impl Default for CloakConfig {
    fn default() -> Self {
        Self {
            weights: DetectorWeights::default(),
            safe_mode_threshold: default_safe_mode_threshold(),
            decision_timeout_ms: default_decision_timeout_ms(),
            block_known_bots: true,
            require_referer: false,
            suspicious_referer_domains: vec![],
            datacenter_asns: default_datacenter_asns(),
        }
    }
}

fn default_safe_mode_threshold() -> u8 {
    60
}

fn default_decision_timeout_ms() -> u64 {
    200
}

fn default_true() -> bool {
    true
}

/// AWS, Google Cloud, Azure, OVH, Hetzner, DigitalOcean, Oracle, Linode,
/// Vultr, Alibaba.
fn default_datacenter_asns() -> Vec<u32> {
    vec![
        16509, 14618, 15169, 396982, 8075, 16276, 24940, 14061, 31898, 63949, 20473, 45102,
    ]
}
