use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The per-request fingerprint the detectors operate on.
///
/// Built once by the gateway from trusted headers; detectors never read the
/// raw HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRequest {
    pub ip: IpAddr,
    pub user_agent: String,
    pub referer: Option<String>,
    /// Path + query as received, e.g. `/?gclid=abc`.
    pub url: String,
    pub host: String,
}

impl VisitRequest {
    pub fn new(ip: IpAddr, user_agent: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            ip,
            user_agent: user_agent.into(),
            referer: None,
            url: url.into(),
            host: String::new(),
        }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}
