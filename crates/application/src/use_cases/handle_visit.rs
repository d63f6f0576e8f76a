use super::ResolveOfferUseCase;
use crate::engine::DecisionEngine;
use crate::ports::DecisionLogQueue;
use autoguard_domain::{
    CloakDecision, DecisionLogRecord, DomainError, TrackingParams, Variant, VisitRequest,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// How the gateway identified the offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferRoute {
    Subdomain(String),
    CustomDomain(String),
}

/// What the gateway should do with the visitor.
#[derive(Debug)]
pub enum VisitOutcome {
    /// No servable offer behind this route: generic 404.
    NotFound,
    /// Serve `<subdomain>/<variant>/index.html` via internal dispatch and
    /// enqueue `log` after responding.
    Serve {
        subdomain: String,
        variant: Variant,
        log: Box<DecisionLogRecord>,
    },
}

/// The visit orchestration: resolve → gate → decide → map variant →
/// compose the log record.
pub struct HandleVisitUseCase {
    resolver: Arc<ResolveOfferUseCase>,
    engine: Arc<DecisionEngine>,
    log_queue: Arc<dyn DecisionLogQueue>,
}

impl HandleVisitUseCase {
    pub fn new(
        resolver: Arc<ResolveOfferUseCase>,
        engine: Arc<DecisionEngine>,
        log_queue: Arc<dyn DecisionLogQueue>,
    ) -> Self {
        Self {
            resolver,
            engine,
            log_queue,
        }
    }

    pub async fn execute(
        &self,
        route: OfferRoute,
        request: VisitRequest,
    ) -> Result<VisitOutcome, DomainError> {
        let offer = match &route {
            OfferRoute::Subdomain(subdomain) => self.resolver.by_subdomain(subdomain).await?,
            OfferRoute::CustomDomain(domain) => self.resolver.by_domain(domain).await?,
        };

        let offer = match offer {
            Some(offer) if offer.is_servable() => offer,
            Some(offer) => {
                debug!(
                    offer_id = offer.id,
                    status = offer.status.as_str(),
                    "Offer not servable"
                );
                return Ok(VisitOutcome::NotFound);
            }
            None => return Ok(VisitOutcome::NotFound),
        };

        // Custom domains are only routable while verified.
        if matches!(route, OfferRoute::CustomDomain(_)) && !offer.serves_custom_domain() {
            return Ok(VisitOutcome::NotFound);
        }

        let subdomain = offer.subdomain.as_str().to_string();

        if !offer.cloak_enabled {
            // Safe unconditionally, no detector work at all.
            let decision = CloakDecision::safe(
                offer.id,
                offer.user_id,
                request.clone(),
                None,
                "cloak disabled",
            );
            let tracking = TrackingParams::extract(&request.url);
            let log = DecisionLogRecord::compose(&decision, None, &tracking);
            return Ok(VisitOutcome::Serve {
                subdomain,
                variant: Variant::B,
                log: Box::new(log),
            });
        }

        let output = self.engine.decide(&request, &offer).await;
        let variant = Variant::from(output.decision.decision);
        let log = DecisionLogRecord::compose(
            &output.decision,
            output.intel.as_ref(),
            &output.tracking,
        );

        debug!(
            offer_id = offer.id,
            decision = output.decision.decision.as_str(),
            score = output.decision.score,
            variant = variant.as_str(),
            elapsed_ms = output.decision.processing_time_ms,
            "Visit decided"
        );

        Ok(VisitOutcome::Serve {
            subdomain,
            variant,
            log: Box::new(log),
        })
    }

    /// Fire-and-forget log enqueue, called after the response is on the
    /// wire. Enqueue failure is logged and the record dropped: the hot path
    /// never blocks on cache availability.
    pub async fn log(&self, record: DecisionLogRecord) {
        if let Err(e) = self.log_queue.enqueue(&record).await {
            warn!(error = %e, offer_id = record.offer_id, "Decision log enqueue failed, record dropped");
        }
    }
}
