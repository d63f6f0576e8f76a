use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid subdomain: {0}")]
    InvalidSubdomain(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR range: {0}")]
    InvalidCidr(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Queue error: {0}")]
    QueueError(String),

    #[error("GeoIP error: {0}")]
    GeoIpError(String),

    #[error("Decision deadline exceeded")]
    DecisionTimeout,

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Invalid job payload: {0}")]
    InvalidJobPayload(String),

    #[error("Page generation failed: {0}")]
    PageGenerationFailed(String),

    #[error("I/O error: {0}")]
    IoError(String),
}
