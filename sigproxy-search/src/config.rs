//! Backend and search configuration with sensible defaults.
//!
//! [`BackendConfig`] says where signed requests go and how they are signed.
//! [`SearchSettings`] tells the orchestration client which document fields
//! to search, return, highlight and facet on. Both are read once at startup
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

/// Where the managed search backend lives and how requests to it are signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Full backend URL the signed request is sent to, including the
    /// multi-search path (e.g. `https://abc.us-east-1.aoss.amazonaws.com/_msearch`).
    pub endpoint: String,
    /// Region used in the SigV4 credential scope.
    pub region: String,
    /// Service identifier used in the SigV4 credential scope
    /// (`aoss` for OpenSearch Serverless, `es` for managed domains).
    pub service: String,
    /// Per-request timeout in seconds. `0` means no timeout.
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9200/_msearch".into(),
            region: "us-east-1".into(),
            service: "aoss".into(),
            timeout_seconds: 0,
        }
    }
}

impl BackendConfig {
    /// Creates a config for `endpoint` with the default region and service.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Sets the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the signing service identifier.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Parses the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the endpoint is not an absolute
    /// `http`/`https` URL with a host.
    pub fn endpoint_url(&self) -> Result<Url, SearchError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| SearchError::Config(format!("invalid backend endpoint: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchError::Config(format!(
                "backend endpoint scheme must be http or https, got {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(SearchError::Config(
                "backend endpoint must include a host".into(),
            ));
        }
        Ok(url)
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `endpoint` is an absolute http(s) URL with a host
    /// - `region` is not empty
    /// - `service` is not empty
    pub fn validate(&self) -> Result<(), SearchError> {
        self.endpoint_url()?;
        if self.region.trim().is_empty() {
            return Err(SearchError::Config("region must not be empty".into()));
        }
        if self.service.trim().is_empty() {
            return Err(SearchError::Config("service must not be empty".into()));
        }
        Ok(())
    }
}

/// Field lists used when translating UI requests into backend queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Fields matched against the query text.
    pub search_attributes: Vec<String>,
    /// Fields returned in each hit.
    pub result_attributes: Vec<String>,
    /// Fields highlighted in each hit.
    pub highlight_attributes: Vec<String>,
    /// Fields that may be requested as facets.
    pub facet_attributes: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            search_attributes: strings(&["name", "description", "type.keyword"]),
            result_attributes: strings(&["name", "description", "type", "score"]),
            highlight_attributes: strings(&["description"]),
            facet_attributes: strings(&["type.keyword"]),
        }
    }
}

impl SearchSettings {
    /// Validates this configuration. At least one search attribute is required.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.search_attributes.is_empty() {
            return Err(SearchError::Config(
                "at least one search attribute must be configured".into(),
            ));
        }
        if self
            .search_attributes
            .iter()
            .chain(&self.result_attributes)
            .chain(&self.highlight_attributes)
            .chain(&self.facet_attributes)
            .any(|a| a.trim().is_empty())
        {
            return Err(SearchError::Config(
                "attribute names must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Returns true if `attribute` may be aggregated as a facet.
    pub fn is_facet(&self, attribute: &str) -> bool {
        self.facet_attributes.iter().any(|f| f == attribute)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}
