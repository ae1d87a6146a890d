//! Security response headers.
//!
//! # Responsibilities
//! - Add `X-Content-Type-Options: nosniff` and `X-Frame-Options: DENY`
//!
//! # Design Decisions
//! - Applied to every response (success, errors, preflight) rather than
//!   only to successful submissions
//! - Toggle read per request so a config reload takes effect immediately

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;

/// Insert the hardening headers into `headers`.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
}

pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let enabled = state.config.load().security.enable_headers;
    let mut response = next.run(request).await;
    if enabled {
        apply_security_headers(response.headers_mut());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_security_headers() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers);
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
    }
}
