//! # sigproxy-search
//!
//! Search orchestration and SigV4-signed transport for the sigproxy edge.
//!
//! This crate turns an InstantSearch-style UI request into a multi-search
//! query for a managed OpenSearch backend, boosts it, signs it with
//! short-lived credentials and translates the backend's reply back into the
//! UI's result shape.
//!
//! ## Design
//!
//! - [`SearchClient`] orchestrates one request cycle and runs [`SearchHooks`]
//! - [`QueryAugmentor`] is the before-search hook that wraps the query in a
//!   `function_score` boost
//! - [`SigningTransporter`] implements [`NetworkRequestPerformer`]: it
//!   serializes the batch, signs it and sends it, returning the raw reply
//! - Credentials come from an injected [`CredentialSource`]
//!
//! ## Security
//!
//! - Credentials are resolved per call and never logged; their `Debug`
//!   output is redacted
//! - Query text is logged only at trace level
//! - Redirects are never followed with signed headers

pub mod augment;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod signing;
pub mod transport;
pub mod types;

pub use augment::{BoostRule, QueryAugmentor};
pub use config::{BackendConfig, SearchSettings};
pub use credentials::{CredentialSource, Credentials};
pub use error::{Result, SearchError};
pub use orchestrator::{SearchClient, SearchHooks};
pub use transport::{NetworkRequestPerformer, SigningTransporter};
pub use types::{RawResponse, SearchRequest, SearchResponse, SearchResults};

/// Hooks that apply the default relevance boost before every search.
///
/// # Examples
///
/// ```
/// let hooks = sigproxy_search::boosted_hooks();
/// assert!(format!("{hooks:?}").contains("before_search: true"));
/// ```
pub fn boosted_hooks() -> SearchHooks {
    SearchHooks::new().with_before_search(QueryAugmentor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boosted_hooks_install_only_before_search() {
        let printed = format!("{:?}", boosted_hooks());
        assert!(printed.contains("before_search: true"));
        assert!(printed.contains("after_search: false"));
    }
}
