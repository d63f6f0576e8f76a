use std::collections::BTreeMap;

/// Query parameters that identify paid ad traffic.
///
/// Only allow-listed keys are kept: unknown parameters are dropped so the
/// evidence blob stays bounded regardless of what the visitor appends.
const TRACKING_PARAM_KEYS: &[&str] = &[
    "gclid",
    "fbclid",
    "msclkid",
    "ttclid",
    "twclid",
    "ref",
    "affiliate_id",
    "click_id",
];

const TRACKING_PARAM_PREFIXES: &[&str] = &["utm_"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingParams {
    params: BTreeMap<String, String>,
}

impl TrackingParams {
    /// Extract allow-listed tracking parameters from a request URL
    /// (path + query or a full URL).
    pub fn extract(url: &str) -> Self {
        let mut params = BTreeMap::new();

        let query = match url.split_once('?') {
            Some((_, q)) => q,
            None => return Self { params },
        };
        // Strip any fragment the proxy let through.
        let query = query.split('#').next().unwrap_or("");

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = match pair.split_once('=') {
                Some((k, v)) => (k, v),
                None => (pair, ""),
            };
            let key = percent_decode(raw_key).to_lowercase();
            if !is_tracking_key(&key) {
                continue;
            }
            params.insert(key, percent_decode(raw_value));
        }

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    pub fn gclid(&self) -> Option<&str> {
        self.get("gclid")
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether any paid-click identifier is present (gclid, fbclid, ...).
    pub fn has_ad_click_id(&self) -> bool {
        ["gclid", "fbclid", "msclkid", "ttclid", "twclid", "click_id"]
            .iter()
            .any(|k| self.params.contains_key(*k))
    }
}

fn is_tracking_key(key: &str) -> bool {
    TRACKING_PARAM_KEYS.contains(&key)
        || TRACKING_PARAM_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Minimal percent-decoding; '+' decodes to space as in form encoding.
/// Malformed escapes are passed through verbatim.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
