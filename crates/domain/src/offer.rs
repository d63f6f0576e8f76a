use crate::errors::DomainError;
use crate::validators::{validate_country_code, validate_domain_name, validate_subdomain};
use serde::{Deserialize, Serialize};

/// A validated six-character landing subdomain.
///
/// Immutable after offer creation; globally unique across tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subdomain(String);

impl Subdomain {
    pub fn new(s: &str) -> Result<Self, DomainError> {
        validate_subdomain(s).map_err(DomainError::InvalidSubdomain)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Subdomain {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Subdomain::new(&s)
    }
}

impl From<Subdomain> for String {
    fn from(s: Subdomain) -> Self {
        s.0
    }
}

impl std::fmt::Display for Subdomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomDomainStatus {
    None,
    Pending,
    Verified,
    Failed,
}

impl CustomDomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomDomainStatus::None => "none",
            CustomDomainStatus::Pending => "pending",
            CustomDomainStatus::Verified => "verified",
            CustomDomainStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(CustomDomainStatus::None),
            "pending" => Some(CustomDomainStatus::Pending),
            "verified" => Some(CustomDomainStatus::Verified),
            "failed" => Some(CustomDomainStatus::Failed),
            _ => None,
        }
    }
}

impl Default for CustomDomainStatus {
    fn default() -> Self {
        CustomDomainStatus::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Draft,
    Active,
    Paused,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::Active => "active",
            OfferStatus::Paused => "paused",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OfferStatus::Draft),
            "active" => Some(OfferStatus::Active),
            "paused" => Some(OfferStatus::Paused),
            _ => None,
        }
    }
}

/// A tenant-owned landing configuration.
///
/// Routing is keyed by `subdomain` (always) and `custom_domain` (only while
/// `custom_domain_status` is `Verified`). An offer that is not servable must
/// never be shown the Money variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub user_id: i64,
    pub subdomain: Subdomain,
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub custom_domain_status: CustomDomainStatus,
    pub cloak_enabled: bool,
    /// ISO-3166 alpha-2 codes. Empty = any country allowed.
    #[serde(default)]
    pub target_countries: Vec<String>,
    pub status: OfferStatus,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Offer {
    /// An offer may serve traffic only while active and not soft-deleted.
    pub fn is_servable(&self) -> bool {
        self.status == OfferStatus::Active && !self.deleted
    }

    /// Whether this offer currently answers for its custom domain.
    pub fn serves_custom_domain(&self) -> bool {
        self.custom_domain.is_some() && self.custom_domain_status == CustomDomainStatus::Verified
    }

    pub fn has_target_countries(&self) -> bool {
        !self.target_countries.is_empty()
    }

    pub fn is_target_country(&self, country: &str) -> bool {
        self.target_countries.iter().any(|c| c == country)
    }

    /// Validate cross-field invariants before persisting.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(domain) = &self.custom_domain {
            validate_domain_name(domain).map_err(DomainError::InvalidDomainName)?;
        }
        for code in &self.target_countries {
            validate_country_code(code).map_err(DomainError::InvalidCountryCode)?;
        }
        Ok(())
    }
}
