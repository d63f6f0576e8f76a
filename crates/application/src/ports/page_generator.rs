use async_trait::async_trait;
use autoguard_domain::{DomainError, PageGenerationJob, Variant};

/// The rendered output of one generation job.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub html: String,
    /// Co-located assets, relative path → bytes.
    pub assets: Vec<(String, Vec<u8>)>,
}

/// External collaborator port: the headless scraper and the AI safe-page
/// generator live behind this trait. The core only knows the contract.
#[async_trait]
pub trait PageGenerator: Send + Sync {
    async fn generate(&self, job: &PageGenerationJob) -> Result<GeneratedPage, DomainError>;
}

/// Writes a generated page into the static layout the front proxy serves:
/// `<page_root>/<subdomain>/<variant>/index.html` plus `assets/`.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn write_page(
        &self,
        subdomain: &str,
        variant: Variant,
        page: &GeneratedPage,
    ) -> Result<(), DomainError>;
}
