//! Best-effort client identification from proxy headers. The result is an
//! opaque rate-limit key, not a verified address, so no format validation
//! is performed.

use axum::http::HeaderMap;

/// Fallback identifier when no proxy header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract a client identifier from request headers. Precedence:
/// `x-forwarded-for` (first entry), `x-real-ip`, `cf-connecting-ip`,
/// then the literal `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }

    if let Some(cf_ip) = headers.get("cf-connecting-ip").and_then(|v| v.to_str().ok()) {
        return cf_ip.to_string();
    }

    UNKNOWN_CLIENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let map = headers(&[("x-forwarded-for", "1.2.3.4, 5.6.7.8")]);
        assert_eq!(client_ip(&map), "1.2.3.4");
    }

    #[test]
    fn real_ip_is_second_choice() {
        let map = headers(&[("x-real-ip", "9.9.9.9")]);
        assert_eq!(client_ip(&map), "9.9.9.9");
    }

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let map = headers(&[("x-real-ip", "9.9.9.9"), ("x-forwarded-for", "1.2.3.4")]);
        assert_eq!(client_ip(&map), "1.2.3.4");
    }

    #[test]
    fn cloudflare_header_is_third_choice() {
        let map = headers(&[("cf-connecting-ip", "8.8.4.4")]);
        assert_eq!(client_ip(&map), "8.8.4.4");
    }

    #[test]
    fn no_headers_yields_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
