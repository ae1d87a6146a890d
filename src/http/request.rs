//! Request inspection.
//!
//! # Responsibilities
//! - Derive the client address used as the rate-limit key
//! - Read the request ID assigned by the request-id layer
//!
//! # Design Decisions
//! - The relay runs behind a proxy/edge: the socket peer is the proxy, so
//!   the address comes from forwarding headers
//! - Clients without any forwarding header share the "unknown" bucket

use axum::http::HeaderMap;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Rate-limit key for requests that carry no address header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client address from forwarding headers.
///
/// Order: first hop of `X-Forwarded-For`, then `X-Real-IP`, then
/// [`UNKNOWN_CLIENT`]. Empty values fall through to the next source.
pub fn client_address(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// The request ID, or "unknown" when the layer did not run.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1, 10.0.0.2"), ("x-real-ip", "10.9.9.9")]);
        assert_eq!(client_address(&h), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let h = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(client_address(&h), "198.51.100.4");

        let h = headers(&[("x-forwarded-for", " , 10.0.0.1"), ("x-real-ip", "198.51.100.4")]);
        assert_eq!(client_address(&h), "198.51.100.4");
    }

    #[test]
    fn test_unknown_bucket() {
        assert_eq!(client_address(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_request_id() {
        let h = headers(&[(X_REQUEST_ID, "abc-123")]);
        assert_eq!(request_id(&h), "abc-123");
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
