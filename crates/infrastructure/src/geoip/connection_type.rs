use autoguard_domain::ConnectionType;

/// Keyword tables for inferring a connection type from the ASN
/// organization name. Checked in a fixed order: mobile, datacenter,
/// residential; the first table with a hit wins.
const MOBILE_KEYWORDS: &[&str] = &[
    "mobile",
    "wireless",
    "cellular",
    "t-mobile",
    "vodafone",
    "verizon wireless",
    "at&t mobility",
    "telefonica moviles",
    "orange mobile",
    "mtn",
];

const DATACENTER_KEYWORDS: &[&str] = &[
    "amazon",
    "aws",
    "google cloud",
    "google llc",
    "microsoft",
    "azure",
    "digitalocean",
    "linode",
    "vultr",
    "ovh",
    "hetzner",
    "alibaba",
    "oracle",
    "hosting",
    "datacenter",
    "data center",
    "server",
    "cloud",
    "colocation",
    "vps",
    "dedicated",
];

const RESIDENTIAL_KEYWORDS: &[&str] = &[
    "comcast",
    "charter",
    "cox communications",
    "centurylink",
    "frontier",
    "telecom",
    "broadband",
    "cable",
    "dsl",
    "fiber",
    "fibre",
    "residential",
    "kabel",
];

/// Infer the connection type from an organization name.
pub fn infer_connection_type(org: &str) -> ConnectionType {
    let org = org.to_lowercase();
    let hit = |keywords: &[&str]| keywords.iter().any(|k| org.contains(k));

    if hit(MOBILE_KEYWORDS) {
        ConnectionType::Mobile
    } else if hit(DATACENTER_KEYWORDS) {
        ConnectionType::Datacenter
    } else if hit(RESIDENTIAL_KEYWORDS) {
        ConnectionType::Residential
    } else {
        ConnectionType::Unknown
    }
}
