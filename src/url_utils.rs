//! URL validation, resolution and hostname handling.

use url::Url;

/// Accept only well-formed absolute http(s) URLs.
#[must_use]
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

/// Resolve a link target against an optional base URL.
///
/// Absolute http(s) targets pass through; relative targets need a base;
/// every other scheme (mailto, javascript, data) yields `None`.
#[must_use]
pub fn resolve_link(href: &str, base: Option<&str>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if is_valid_url(href) {
        return Some(href.to_string());
    }
    // Refuse non-web schemes outright.
    if href.contains(':') && !href.starts_with("//") {
        return None;
    }
    let base = Url::parse(base?).ok()?;
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// Hostname of a URL, with any leading `@` stripped.
#[must_use]
pub fn extract_hostname(candidate: &str) -> Option<String> {
    let parsed = Url::parse(candidate).ok()?;
    let host = parsed.host_str()?;
    Some(host.trim_start_matches('@').to_string())
}
