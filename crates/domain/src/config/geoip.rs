use serde::{Deserialize, Serialize};

/// Paths to the on-disk GeoIP databases. Any of them may be absent: the
/// corresponding fields degrade to "unknown" for the process lifetime, which
/// is logged at startup but never fatal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoIpConfig {
    #[serde(default = "default_city_db")]
    pub city_db_path: String,

    #[serde(default = "default_asn_db")]
    pub asn_db_path: String,

    /// Anonymous-IP database (VPN/proxy/Tor/hosting flags). Optional even
    /// in full deployments.
    #[serde(default = "default_anonymous_db")]
    pub anonymous_db_path: String,
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            city_db_path: default_city_db(),
            asn_db_path: default_asn_db(),
            anonymous_db_path: default_anonymous_db(),
        }
    }
}

fn default_city_db() -> String {
    "./geoip/GeoLite2-City.mmdb".to_string()
}

fn default_asn_db() -> String {
    "./geoip/GeoLite2-ASN.mmdb".to_string()
}

fn default_anonymous_db() -> String {
    "./geoip/GeoIP2-Anonymous-IP.mmdb".to_string()
}
