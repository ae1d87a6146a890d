//! Cross-origin policy for the website's form.
//!
//! Browsers only let the page read the relay's answer when the answer names
//! the page's origin. Origins are matched exactly against the allow-list and
//! echoed back; anything else gets no header at all.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_MAX_AGE, ORIGIN,
        },
        HeaderMap, HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::CorsConfig;
use crate::http::server::AppState;

/// Methods advertised to preflight requests.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
/// Request headers advertised to preflight requests.
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// The origin to echo, if the request's origin is allow-listed.
pub fn allowed_origin(headers: &HeaderMap, config: &CorsConfig) -> Option<HeaderValue> {
    let origin = headers.get(ORIGIN)?;
    let origin_str = origin.to_str().ok()?;
    config
        .allowed_origins
        .iter()
        .any(|allowed| allowed == origin_str)
        .then(|| origin.clone())
}

/// Middleware echoing the allowed origin on every response, errors included.
pub async fn cors_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = allowed_origin(request.headers(), &state.config.load().cors);
    let mut response = next.run(request).await;
    if let Some(origin) = origin {
        response.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    response
}

/// Preflight handler: `204 No Content` with the allowed methods and headers.
///
/// Runs before any rate limiting or body handling.
pub async fn preflight(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.load();
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    if let Some(max_age) = config.cors.max_age_secs {
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
    }
    (StatusCode::NO_CONTENT, headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CorsConfig {
        CorsConfig {
            allowed_origins: vec!["https://site.example.com".into(), "http://localhost:3000".into()],
            max_age_secs: None,
        }
    }

    fn with_origin(origin: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static(origin));
        headers
    }

    #[test]
    fn test_allowed_origin_is_echoed() {
        let echoed = allowed_origin(&with_origin("http://localhost:3000"), &config());
        assert_eq!(echoed.unwrap(), "http://localhost:3000");
    }

    #[test]
    fn test_unlisted_origin_is_omitted() {
        assert!(allowed_origin(&with_origin("https://evil.example.com"), &config()).is_none());
        // Exact match only: no prefix or case folding.
        assert!(allowed_origin(&with_origin("https://site.example.com.evil.net"), &config()).is_none());
        assert!(allowed_origin(&with_origin("HTTPS://SITE.EXAMPLE.COM"), &config()).is_none());
    }

    #[test]
    fn test_missing_origin() {
        assert!(allowed_origin(&HeaderMap::new(), &config()).is_none());
    }
}
