//! Shared HTTP client for backend requests.
//!
//! The client follows no redirects: a redirect would send the signed headers
//! to a URL they were not computed for.

use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::SearchError;

/// User-Agent sent with every backend request.
pub const USER_AGENT: &str = concat!("sigproxy/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for signed backend calls.
///
/// The client has:
/// - No redirect following
/// - A request timeout only when `config.timeout_seconds > 0`
/// - A fixed `sigproxy/<version>` User-Agent
///
/// # Errors
///
/// Returns [`SearchError::Network`] if the client cannot be constructed.
pub fn build_client(config: &BackendConfig) -> Result<reqwest::Client, SearchError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none());

    if config.timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
    }

    builder
        .build()
        .map_err(|e| SearchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Connect timeout for link-local credential endpoints.
pub const METADATA_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
/// Overall timeout for one credential endpoint call.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a [`reqwest::Client`] for container and instance metadata calls.
///
/// Same shape as [`build_client`], with connect and request timeouts
/// always set.
///
/// # Errors
///
/// Returns [`SearchError::Credential`] if the client cannot be constructed.
pub fn build_metadata_client() -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(METADATA_CONNECT_TIMEOUT)
        .timeout(METADATA_TIMEOUT)
        .build()
        .map_err(|e| SearchError::Credential(format!("failed to build metadata client: {e}")))
}
