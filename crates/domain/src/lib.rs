//! AutoGuard Domain Layer
pub mod blacklist;
pub mod cloak_decision;
pub mod config;
pub mod errors;
pub mod ip_intelligence;
pub mod offer;
pub mod page_job;
pub mod tracking;
pub mod validators;
pub mod visit;

pub use blacklist::{
    BlacklistEntry, BlacklistHit, BlacklistKind, BlacklistScope, GeoBlockType, UaMatchType,
    UaPattern,
};
pub use cloak_decision::{CloakDecision, Decision, DecisionLogRecord, DetectorOutcome, Layer};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use ip_intelligence::{ConnectionType, IpIntelligence};
pub use offer::{CustomDomainStatus, Offer, OfferStatus, Subdomain};
pub use page_job::{DeadLetterRecord, JobAction, Page, PageGenerationJob, PageStatus, Variant};
pub use tracking::TrackingParams;
pub use visit::VisitRequest;
