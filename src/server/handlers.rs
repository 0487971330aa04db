//! Request handling for the single catch-all route.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use sigproxy_search::SearchError;

use super::AppState;
use super::cors;
use crate::error::Result;

/// Any method, any path.
///
/// `OPTIONS` is answered locally; every other method is treated as a
/// search and its body must be a JSON array of UI requests.
pub(super) async fn handle_any(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response> {
    if method == Method::OPTIONS {
        return Ok((StatusCode::NO_CONTENT, cors::preflight_headers()).into_response());
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| SearchError::MalformedRequest(format!("body is not valid JSON: {e}")))?;
    tracing::debug!(%method, bytes = body.len(), "search request");

    let response = state.client.handle_request(payload, &state.hooks).await?;
    tracing::debug!(results = response.results.len(), "search completed");

    Ok((StatusCode::OK, cors::response_headers(), Json(response)).into_response())
}
