//! # sigproxy
//!
//! CORS edge proxy for a managed search backend.
//!
//! The edge accepts an InstantSearch-style request from a browser, boosts
//! the query with a `function_score` rule, signs the outbound call with
//! AWS SigV4 and returns the backend's reply in the UI's result shape.
//! Search orchestration, boosting and signing live in [`sigproxy_search`];
//! this crate holds the HTTP edge, configuration and process wiring.

pub mod config;
pub mod error;
pub mod server;

use std::sync::Arc;

use sigproxy_search::{CredentialSource, SearchClient, SigningTransporter};

pub use config::{ProxyConfig, ServerConfig};
pub use error::{ProxyError, Result};
pub use server::{ProxyServer, router};

/// Wires an orchestration client to a signing transporter for `config`.
///
/// # Errors
///
/// Returns an error if the backend section is invalid or the HTTP client
/// cannot be built.
pub fn build_client(
    config: &ProxyConfig,
    credentials: Arc<dyn CredentialSource>,
) -> Result<SearchClient> {
    let transporter = SigningTransporter::new(&config.backend, credentials)?;
    tracing::info!(
        endpoint = %transporter.endpoint(),
        region = %config.backend.region,
        service = %config.backend.service,
        "signing transporter ready"
    );
    Ok(SearchClient::new(
        Arc::new(transporter),
        config.search.clone(),
    ))
}
