use crate::ports::{OfferCache, OfferCacheKey, OfferRepository};
use autoguard_domain::{DomainError, Offer};
use std::sync::Arc;
use tracing::debug;

/// Offer resolution with a shared-cache tier in front of the primary store.
///
/// Cache misses fall through to the repository and populate the cache;
/// negative lookups are not cached, so a freshly created offer resolves on
/// its first visit. Routing writes must call `invalidate` for all three
/// keys of the affected offer.
pub struct ResolveOfferUseCase {
    repository: Arc<dyn OfferRepository>,
    cache: Arc<dyn OfferCache>,
}

impl ResolveOfferUseCase {
    pub fn new(repository: Arc<dyn OfferRepository>, cache: Arc<dyn OfferCache>) -> Self {
        Self { repository, cache }
    }

    pub async fn by_id(&self, id: i64) -> Result<Option<Offer>, DomainError> {
        self.resolve(OfferCacheKey::Id(id), || self.repository.find_by_id(id))
            .await
    }

    pub async fn by_subdomain(&self, subdomain: &str) -> Result<Option<Offer>, DomainError> {
        self.resolve(OfferCacheKey::Subdomain(subdomain.to_string()), || {
            self.repository.find_by_subdomain(subdomain)
        })
        .await
    }

    pub async fn by_domain(&self, domain: &str) -> Result<Option<Offer>, DomainError> {
        let domain = domain.to_ascii_lowercase();
        self.resolve(OfferCacheKey::Domain(domain.clone()), || {
            self.repository.find_by_domain(&domain)
        })
        .await
    }

    pub async fn invalidate(&self, offer: &Offer) {
        self.cache.invalidate(offer).await;
    }

    async fn resolve<'a, F, Fut>(
        &'a self,
        key: OfferCacheKey,
        fetch: F,
    ) -> Result<Option<Offer>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Option<Offer>, DomainError>> + 'a,
    {
        if let Some(offer) = self.cache.get(&key).await {
            return Ok(Some(offer));
        }

        let offer = fetch().await?;
        if let Some(offer) = &offer {
            debug!(offer_id = offer.id, key = ?key, "Offer cache populated");
            self.cache.put(&key, offer).await;
        }
        Ok(offer)
    }
}
