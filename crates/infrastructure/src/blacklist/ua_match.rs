use autoguard_domain::{UaMatchType, UaPattern};
use fancy_regex::Regex;
use tracing::debug;

/// Match a user agent against one pattern entry.
///
/// Exact and contains comparisons are case-insensitive. Regex patterns are
/// compiled on the fly; a pattern that fails to compile (or whose engine
/// errors at match time) is a non-match, never an error.
pub fn ua_matches(pattern: &UaPattern, user_agent: &str) -> bool {
    match pattern.match_type {
        UaMatchType::Exact => user_agent.eq_ignore_ascii_case(&pattern.pattern),
        UaMatchType::Contains => user_agent
            .to_lowercase()
            .contains(&pattern.pattern.to_lowercase()),
        UaMatchType::Regex => match Regex::new(&pattern.pattern) {
            Ok(regex) => regex.is_match(user_agent).unwrap_or(false),
            Err(e) => {
                debug!(pattern = %pattern.pattern, error = %e, "Unusable UA regex, treating as non-match");
                false
            }
        },
    }
}
