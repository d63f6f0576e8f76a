use async_trait::async_trait;
use autoguard_domain::{DomainError, Offer};

/// Primary-store access to offer rows.
///
/// Lookups return `None` for rows that exist but are soft-deleted;
/// `find_by_domain` additionally requires a verified custom domain, so the
/// resolver never routes traffic to a half-configured domain.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Offer>, DomainError>;

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Offer>, DomainError>;

    /// Resolve a verified custom domain to its offer. The domain is matched
    /// lowercased.
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Offer>, DomainError>;
}

/// The three cache keys an offer is reachable under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OfferCacheKey {
    Id(i64),
    Subdomain(String),
    Domain(String),
}

impl OfferCacheKey {
    /// Cache key suffix under the shared namespace, e.g. `offer:id:42`.
    pub fn suffix(&self) -> String {
        match self {
            OfferCacheKey::Id(id) => format!("offer:id:{id}"),
            OfferCacheKey::Subdomain(s) => format!("offer:subdomain:{s}"),
            OfferCacheKey::Domain(d) => format!("offer:domain:{d}"),
        }
    }
}

/// Shared-cache tier in front of the offer repository.
///
/// All operations are best-effort: a cache failure reads as a miss and
/// writes are silently dropped. The resolver must function with the cache
/// completely down.
#[async_trait]
pub trait OfferCache: Send + Sync {
    async fn get(&self, key: &OfferCacheKey) -> Option<Offer>;

    async fn put(&self, key: &OfferCacheKey, offer: &Offer);

    /// Drop all three keys for the offer. Called by any write that mutates
    /// routing (target countries, custom domain state, cloak flag).
    async fn invalidate(&self, offer: &Offer);
}
