//! Error types for the sigproxy-search crate.
//!
//! Messages are stable strings suitable for logs and for the plain-text
//! error bodies the edge returns. Secret material never appears in them.

/// Errors that can occur while orchestrating a signed backend search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No usable signing credentials could be resolved.
    #[error("credential error: {0}")]
    Credential(String),

    /// The outbound call failed before a complete response was obtained
    /// (DNS, TCP, TLS, or reading the response body).
    #[error("network error: {0}")]
    Network(String),

    /// The inbound request body could not be understood.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The request envelope could not be signed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Invalid backend or search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns true when the caller sent something unusable, as opposed to
    /// a failure on the proxy's own side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedRequest(_))
    }
}

/// Convenience type alias for sigproxy-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_credential() {
        let err = SearchError::Credential("no source resolved".into());
        assert_eq!(err.to_string(), "credential error: no source resolved");
    }

    #[test]
    fn display_network() {
        let err = SearchError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");
    }

    #[test]
    fn display_malformed_request() {
        let err = SearchError::MalformedRequest("expected an array".into());
        assert_eq!(err.to_string(), "malformed request: expected an array");
    }

    #[test]
    fn display_signing() {
        let err = SearchError::Signing("endpoint has no host".into());
        assert_eq!(err.to_string(), "signing error: endpoint has no host");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("region must not be empty".into());
        assert_eq!(err.to_string(), "config error: region must not be empty");
    }

    #[test]
    fn only_malformed_request_is_client_error() {
        assert!(SearchError::MalformedRequest("x".into()).is_client_error());
        assert!(!SearchError::Network("x".into()).is_client_error());
        assert!(!SearchError::Credential("x".into()).is_client_error());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
