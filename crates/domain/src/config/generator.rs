use serde::{Deserialize, Serialize};

/// Endpoints of the external page-generation collaborators: the headless
/// scraper and the AI safe-page generator. Both live outside this process;
/// only their HTTP contract is known here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_scraper_url")]
    pub scraper_url: String,

    #[serde(default = "default_ai_url")]
    pub ai_url: String,

    /// Per-job HTTP timeout. Generation is slow by nature (headless render,
    /// model calls); failures are retried by the job runner, not here.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scraper_url: default_scraper_url(),
            ai_url: default_ai_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_scraper_url() -> String {
    "http://127.0.0.1:7301/scrape".to_string()
}

fn default_ai_url() -> String {
    "http://127.0.0.1:7302/generate".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}
