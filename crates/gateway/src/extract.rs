use autoguard_application::use_cases::OfferRoute;
use autoguard_domain::validators::SUBDOMAIN_LEN;
use http::header::HeaderMap;
use std::net::IpAddr;

const HDR_SUBDOMAIN: &str = "x-subdomain";
const HDR_CUSTOM_DOMAIN: &str = "x-custom-domain";
const HDR_CF_CONNECTING_IP: &str = "cf-connecting-ip";
const HDR_X_FORWARDED_FOR: &str = "x-forwarded-for";
const HDR_X_REAL_IP: &str = "x-real-ip";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn is_subdomain_shaped(s: &str) -> bool {
    s.len() == SUBDOMAIN_LEN
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Pull a six-char subdomain out of a `/c/{subdomain}` path. The segment
/// must be followed by a slash, a query string, or the end of the path.
/// The `?` terminator matters when a caller hands over the raw
/// path-and-query instead of a pre-split path.
pub fn subdomain_from_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/c/")?;
    let candidate = rest.get(..SUBDOMAIN_LEN)?;
    if !is_subdomain_shaped(candidate) {
        return None;
    }
    match rest.as_bytes().get(SUBDOMAIN_LEN) {
        None | Some(b'/') | Some(b'?') => Some(candidate),
        _ => None,
    }
}

/// Resolve the routing source for this request, in priority order:
/// 1. `X-Subdomain`, injected by the front proxy for `*.autoguard.dev`;
/// 2. a `/c/{subdomain}` path prefix;
/// 3. `X-Custom-Domain`, injected when the host matched a verified custom
///    domain.
///
/// Only these three sources are consulted; the raw Host header is never
/// trusted for routing.
pub fn resolve_route(headers: &HeaderMap, path: &str) -> Option<OfferRoute> {
    if let Some(subdomain) = header_str(headers, HDR_SUBDOMAIN) {
        if is_subdomain_shaped(subdomain) {
            return Some(OfferRoute::Subdomain(subdomain.to_string()));
        }
    }

    if let Some(subdomain) = subdomain_from_path(path) {
        return Some(OfferRoute::Subdomain(subdomain.to_string()));
    }

    if let Some(domain) = header_str(headers, HDR_CUSTOM_DOMAIN) {
        return Some(OfferRoute::CustomDomain(domain.to_ascii_lowercase()));
    }

    None
}

/// Client IP, trusting only the proxy-injected headers, in order:
/// `CF-Connecting-IP`, first token of `X-Forwarded-For`, `X-Real-IP`, then
/// the transport peer address.
pub fn client_ip(headers: &HeaderMap, peer: IpAddr) -> IpAddr {
    if let Some(ip) = header_str(headers, HDR_CF_CONNECTING_IP).and_then(|v| v.parse().ok()) {
        return ip;
    }

    if let Some(forwarded) = header_str(headers, HDR_X_FORWARDED_FOR) {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .map(str::trim)
            .and_then(|v| v.parse().ok())
        {
            return ip;
        }
    }

    if let Some(ip) = header_str(headers, HDR_X_REAL_IP).and_then(|v| v.parse().ok()) {
        return ip;
    }

    peer
}
