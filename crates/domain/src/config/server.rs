use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_gateway_port")]
    pub gateway_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Root directory for generated static pages:
    /// `<page_root>/<subdomain>/<variant>/index.html`.
    #[serde(default = "default_page_root")]
    pub page_root: String,

    /// When true, responses carry `X-Accel-Redirect` and an empty body for
    /// the front proxy to serve the file. When false (no proxy in front),
    /// the gateway streams the file inline with the identical URL-to-file
    /// mapping.
    #[serde(default = "default_true")]
    pub accel_redirect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            gateway_port: default_gateway_port(),
            bind_address: default_bind_address(),
            page_root: default_page_root(),
            accel_redirect: true,
        }
    }
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_page_root() -> String {
    "./pages".to_string()
}

fn default_true() -> bool {
    true
}
