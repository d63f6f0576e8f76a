use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Who owns a blacklist entry. A hit in either scope blocks: tenant entries
/// extend the global set, they never override a global denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlacklistScope {
    Global,
    Tenant(i64),
}

impl BlacklistScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlacklistScope::Global => "global",
            BlacklistScope::Tenant(_) => "tenant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoBlockType {
    Block,
    HighRisk,
}

impl GeoBlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoBlockType::Block => "block",
            GeoBlockType::HighRisk => "high_risk",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "block" => Some(GeoBlockType::Block),
            "high_risk" => Some(GeoBlockType::HighRisk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UaMatchType {
    Exact,
    Contains,
    Regex,
}

/// A user-agent pattern as stored in the shared cache.
///
/// The wire encoding is either a JSON tag `{"pattern": "...", "type": "..."}`
/// or a bare string, which is treated as a case-insensitive contains match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UaPattern {
    pub pattern: String,
    #[serde(rename = "type")]
    pub match_type: UaMatchType,
}

impl UaPattern {
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: UaMatchType::Contains,
        }
    }

    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: UaMatchType::Exact,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            match_type: UaMatchType::Regex,
        }
    }

    /// Decode a cache entry. JSON-tagged entries carry an explicit match
    /// type; anything that does not parse as the tag is a bare contains
    /// pattern.
    pub fn decode(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            if let Ok(pattern) = serde_json::from_str::<UaPattern>(trimmed) {
                return pattern;
            }
        }
        Self::contains(trimmed)
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.pattern.clone())
    }
}

/// The discriminated payload of a blacklist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlacklistKind {
    Ip { ip: IpAddr },
    Cidr { range: IpNet },
    UserAgent { pattern: UaPattern },
    Asn { asn: u32 },
    Isp { name: String },
    Geo {
        country: String,
        region: Option<String>,
        block_type: GeoBlockType,
    },
}

impl BlacklistKind {
    pub fn kind_str(&self) -> &'static str {
        match self {
            BlacklistKind::Ip { .. } => "ip",
            BlacklistKind::Cidr { .. } => "cidr",
            BlacklistKind::UserAgent { .. } => "user_agent",
            BlacklistKind::Asn { .. } => "asn",
            BlacklistKind::Isp { .. } => "isp",
            BlacklistKind::Geo { .. } => "geo",
        }
    }
}

/// One row of the blacklist, as owned by the primary store. The shared-cache
/// projection (sets, lists, hashes per kind and scope) is rebuilt from these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: i64,
    pub scope: BlacklistScope,
    #[serde(flatten)]
    pub kind: BlacklistKind,
    pub active: bool,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl BlacklistEntry {
    pub fn is_live(&self, now_iso: &str) -> bool {
        if !self.active {
            return false;
        }
        match &self.expires_at {
            // ISO-8601 strings compare lexicographically within one zone.
            Some(expiry) => expiry.as_str() > now_iso,
            None => true,
        }
    }
}

/// A positive membership result: what matched and in which scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistHit {
    pub kind: String,
    pub value: String,
    pub scope: BlacklistScope,
}

impl BlacklistHit {
    pub fn new(kind: &str, value: impl Into<String>, scope: BlacklistScope) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.into(),
            scope,
        }
    }
}
