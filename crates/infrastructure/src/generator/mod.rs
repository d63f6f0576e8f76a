use async_trait::async_trait;
use autoguard_application::ports::{GeneratedPage, PageGenerator};
use autoguard_domain::config::GeneratorConfig;
use autoguard_domain::{DomainError, JobAction, PageGenerationJob};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    html: String,
    #[serde(default)]
    assets: Vec<GeneratedAsset>,
}

#[derive(Debug, Deserialize)]
struct GeneratedAsset {
    path: String,
    content: String,
}

/// HTTP client for the external page-generation collaborators. Scrape jobs
/// go to the headless-browser scraper, ai_generate jobs to the safe-page
/// generator; both answer the same JSON shape.
pub struct HttpPageGenerator {
    client: reqwest::Client,
    scraper_url: String,
    ai_url: String,
}

impl HttpPageGenerator {
    pub fn new(cfg: &GeneratorConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent("AutoGuard/0.3 (page-worker)")
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| DomainError::PageGenerationFailed(e.to_string()))?;
        Ok(Self {
            client,
            scraper_url: cfg.scraper_url.clone(),
            ai_url: cfg.ai_url.clone(),
        })
    }
}

#[async_trait]
impl PageGenerator for HttpPageGenerator {
    async fn generate(&self, job: &PageGenerationJob) -> Result<GeneratedPage, DomainError> {
        let endpoint = match job.action {
            JobAction::Scrape => &self.scraper_url,
            JobAction::AiGenerate => &self.ai_url,
        };

        debug!(
            page_id = job.page_id,
            action = job.action.as_str(),
            endpoint,
            "Dispatching generation request"
        );

        let response = self
            .client
            .post(endpoint)
            .json(job)
            .send()
            .await
            .map_err(|e| DomainError::PageGenerationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::PageGenerationFailed(format!(
                "generator returned {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::PageGenerationFailed(e.to_string()))?;

        Ok(GeneratedPage {
            html: body.html,
            assets: body
                .assets
                .into_iter()
                .map(|a| (a.path, a.content.into_bytes()))
                .collect(),
        })
    }
}
