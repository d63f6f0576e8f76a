use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Residential,
    Business,
    Datacenter,
    Mobile,
    Unknown,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Residential => "residential",
            ConnectionType::Business => "business",
            ConnectionType::Datacenter => "datacenter",
            ConnectionType::Mobile => "mobile",
            ConnectionType::Unknown => "unknown",
        }
    }
}

impl Default for ConnectionType {
    fn default() -> Self {
        ConnectionType::Unknown
    }
}

/// Best-effort result of resolving one IP against the GeoIP databases.
///
/// Every field degrades independently: a missing or unreadable database
/// leaves its fields at their unknown defaults rather than failing the
/// lookup. `lookup_failed` marks a result where no database answered at all,
/// so callers can distinguish "no data" from "negative signal".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpIntelligence {
    pub ip: IpAddr,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub asn: Option<u32>,
    pub organization: Option<String>,
    pub is_datacenter: bool,
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub is_residential: bool,
    pub is_hosting: bool,
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub lookup_failed: bool,
}

impl IpIntelligence {
    /// A result carrying no data, used when every database is absent.
    pub fn unknown(ip: IpAddr) -> Self {
        Self {
            ip,
            country: None,
            region: None,
            city: None,
            timezone: None,
            latitude: None,
            longitude: None,
            asn: None,
            organization: None,
            is_datacenter: false,
            is_vpn: false,
            is_proxy: false,
            is_tor: false,
            is_residential: false,
            is_hosting: false,
            connection_type: ConnectionType::Unknown,
            lookup_failed: false,
        }
    }

    pub fn failed(ip: IpAddr) -> Self {
        Self {
            lookup_failed: true,
            ..Self::unknown(ip)
        }
    }

    /// Any anonymity signal (VPN, proxy, Tor).
    pub fn is_anonymous(&self) -> bool {
        self.is_vpn || self.is_proxy || self.is_tor
    }
}
