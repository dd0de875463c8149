//! Security middleware.
//!
//! - `X-Content-Type-Options: nosniff` on every response
//! - cookie-carrying cross-site requests are rejected with 403

use axum::extract::Request;
use axum::http::header::{self, HeaderName};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::ServerError;

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Reject requests that carry cookies and were initiated by another site.
pub(crate) async fn reject_cross_site_cookies(request: Request, next: Next) -> Response {
    if is_cross_site_with_cookie(request.headers()) {
        tracing::debug!(uri = %request.uri(), "Rejecting cross-site request with cookies");
        return ServerError::CrossSiteCookie.into_response();
    }
    next.run(request).await
}

fn is_cross_site_with_cookie(headers: &HeaderMap) -> bool {
    let cross_site = headers
        .get("sec-fetch-site")
        .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"cross-site"));
    cross_site && headers.contains_key(header::COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_cross_site_with_cookie() {
        assert!(is_cross_site_with_cookie(&headers(&[
            ("sec-fetch-site", "cross-site"),
            ("cookie", "session=1"),
        ])));
    }

    #[test]
    fn test_same_origin_or_cookieless_allowed() {
        assert!(!is_cross_site_with_cookie(&headers(&[
            ("sec-fetch-site", "same-origin"),
            ("cookie", "session=1"),
        ])));
        assert!(!is_cross_site_with_cookie(&headers(&[(
            "sec-fetch-site",
            "cross-site"
        )])));
        assert!(!is_cross_site_with_cookie(&HeaderMap::new()));
    }
}
