pub const SUBDOMAIN_LEN: usize = 6;

/// Subdomains are exactly six lowercase alphanumeric characters. They are
/// chosen once at offer creation and never change afterwards.
pub fn validate_subdomain(s: &str) -> Result<(), String> {
    if s.len() != SUBDOMAIN_LEN {
        return Err(format!(
            "subdomain must be exactly {SUBDOMAIN_LEN} characters"
        ));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err("subdomain must contain only lowercase letters and digits".to_string());
    }
    Ok(())
}

/// Validate a custom domain as a plausible DNS name (labels, lengths,
/// at least one dot). Full resolvability is checked out-of-band by the
/// domain verification flow.
pub fn validate_domain_name(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("domain cannot be empty".to_string());
    }
    if domain.len() > 253 {
        return Err("domain cannot exceed 253 characters".to_string());
    }
    if !domain.contains('.') {
        return Err("domain must contain at least one dot".to_string());
    }
    for label in domain.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err("domain labels must be 1-63 characters".to_string());
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("domain labels cannot start or end with a hyphen".to_string());
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err("domain labels must be alphanumeric or hyphen".to_string());
        }
    }
    Ok(())
}

/// ISO-3166 alpha-2: exactly two ASCII uppercase letters.
pub fn validate_country_code(code: &str) -> Result<(), String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!("invalid ISO-3166 alpha-2 country code: {code}"));
    }
    Ok(())
}
