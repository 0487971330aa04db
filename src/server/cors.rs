//! CORS header sets.
//!
//! The preflight reply and the search reply advertise different method
//! lists: only the search reply includes `HEAD`. Error replies carry no
//! CORS headers at all.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};

/// Methods advertised in the preflight reply.
pub const PREFLIGHT_METHODS: &str = "GET, POST, OPTIONS";
/// Methods advertised on search replies.
pub const RESPONSE_METHODS: &str = "GET, HEAD, POST, OPTIONS";
/// Request headers a browser may send.
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Headers for an `OPTIONS` preflight reply.
pub fn preflight_headers() -> HeaderMap {
    cors_headers(PREFLIGHT_METHODS)
}

/// Headers attached to a successful search reply.
pub fn response_headers() -> HeaderMap {
    cors_headers(RESPONSE_METHODS)
}

fn cors_headers(methods: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_has_exactly_three_headers() {
        let headers = preflight_headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[test]
    fn response_methods_include_head() {
        let headers = response_headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, HEAD, POST, OPTIONS"
        );
    }
}
