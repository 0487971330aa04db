//! The search orchestration client.
//!
//! # Pipeline
//!
//! 1. Deserialize the UI batch (`MalformedRequest` on mismatch)
//! 2. Build one backend request per UI request
//! 3. Run the before-search hook; its result replaces the batch
//! 4. Send the batch through the injected [`NetworkRequestPerformer`]
//! 5. Split the multi-search reply and run the after-search hook
//! 6. Translate each reply into a UI result set

use std::sync::Arc;

use serde_json::Value;

use super::hooks::SearchHooks;
use super::query::build_search_request;
use super::response::{backend_responses, translate_results};
use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::transport::NetworkRequestPerformer;
use crate::types::{SearchRequest, SearchResponse, UiSearchRequest};

/// Translates UI requests into backend searches and back.
#[derive(Clone)]
pub struct SearchClient {
    performer: Arc<dyn NetworkRequestPerformer>,
    settings: SearchSettings,
}

impl SearchClient {
    /// Creates a client sending through `performer`.
    pub fn new(performer: Arc<dyn NetworkRequestPerformer>, settings: SearchSettings) -> Self {
        Self {
            performer,
            settings,
        }
    }

    /// The configured field lists.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Parses an inbound payload into UI requests.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedRequest`] if the payload is not an
    /// array of `{ indexName, params }` objects.
    pub fn parse_payload(payload: Value) -> Result<Vec<UiSearchRequest>, SearchError> {
        if !payload.is_array() {
            return Err(SearchError::MalformedRequest(
                "expected a JSON array of search requests".into(),
            ));
        }
        serde_json::from_value(payload)
            .map_err(|e| SearchError::MalformedRequest(format!("invalid search request: {e}")))
    }

    /// Builds the backend batch for `requests`, before hooks run.
    pub fn build_requests(&self, requests: &[UiSearchRequest]) -> Vec<SearchRequest> {
        requests
            .iter()
            .map(|ui| build_search_request(ui, &self.settings))
            .collect()
    }

    /// Runs one full request cycle for `payload`.
    ///
    /// An empty batch (before or after hooks) returns an empty response
    /// without touching the network. Backend error statuses are not errors.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedRequest`] for an unusable payload and
    /// propagates [`SearchError::Credential`] / [`SearchError::Network`]
    /// from the transport unchanged.
    pub async fn handle_request(
        &self,
        payload: Value,
        hooks: &SearchHooks,
    ) -> Result<SearchResponse, SearchError> {
        let ui_requests = Self::parse_payload(payload)?;
        let built = self.build_requests(&ui_requests);
        let requests = hooks.run_before_search(built);

        if requests.is_empty() {
            tracing::debug!("empty search batch, skipping backend call");
            return Ok(SearchResponse::default());
        }

        let raw = self.performer.perform_network_request(&requests).await?;
        tracing::debug!(status = %raw.status, batch = requests.len(), "backend call completed");

        let responses = backend_responses(&raw, requests.len());
        let mut responses = hooks.run_after_search(&requests, responses);
        responses.resize(requests.len(), Value::Null);

        let results = requests
            .iter()
            .zip(&responses)
            .map(|(request, response)| translate_results(request, response, &self.settings))
            .collect();

        Ok(SearchResponse { results })
    }
}
