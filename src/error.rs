//! Error types for the sigproxy edge.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sigproxy_search::SearchError;

/// Top-level error type for the proxy.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Failure inside the search pipeline (parsing, credentials, transport).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// HTTP status reported to the caller.
    ///
    /// Only an unusable inbound body is the caller's fault; everything else
    /// is a server-side failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Search(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error responses are plain text and carry no CORS headers.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "rejected request");
        }
        (status, self.to_string()).into_response()
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn malformed_request_is_bad_request() {
        let err = ProxyError::from(SearchError::MalformedRequest("not json".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "malformed request: not json");
    }

    #[test]
    fn upstream_failures_are_server_errors() {
        for err in [
            SearchError::Credential("expired".into()),
            SearchError::Network("refused".into()),
            SearchError::Signing("bad header".into()),
        ] {
            assert_eq!(
                ProxyError::from(err).status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
        assert_eq!(
            ProxyError::Config("missing endpoint".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_has_no_cors_headers() {
        let response = ProxyError::from(SearchError::Network("refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            response
                .headers()
                .get("access-control-allow-origin")
                .is_none()
        );
    }
}
