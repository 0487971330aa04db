//! Network transport for backend search batches.
//!
//! [`NetworkRequestPerformer`] is the seam between the orchestration client
//! and the network. [`SigningTransporter`] is the production implementation:
//! it serializes the batch as a multi-search body, signs it with SigV4 and
//! sends it to the configured endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::config::BackendConfig;
use crate::credentials::CredentialSource;
use crate::error::SearchError;
use crate::http::build_client;
use crate::signing::{sign, HttpEnvelope, SigningParams};
use crate::types::{RawResponse, SearchRequest};

/// Sends a batch of backend searches and returns the raw reply.
///
/// Implementations must not interpret the reply's status code: a 4xx/5xx
/// backend response is a successful network result.
#[async_trait]
pub trait NetworkRequestPerformer: Send + Sync {
    /// Perform one network call for `requests`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Credential`] if signing credentials cannot be
    /// resolved, or [`SearchError::Network`] if no complete response could
    /// be obtained.
    async fn perform_network_request(
        &self,
        requests: &[SearchRequest],
    ) -> Result<RawResponse, SearchError>;
}

/// Serializes a batch into the multi-search NDJSON body: a `{"index": ...}`
/// header line followed by the query body line, for every request.
pub fn msearch_body(requests: &[SearchRequest]) -> Result<Bytes, SearchError> {
    let mut out = Vec::new();
    for request in requests {
        let header = serde_json::json!({ "index": request.index_name });
        for line in [&header, &request.body] {
            serde_json::to_writer(&mut out, line).map_err(|e| {
                SearchError::MalformedRequest(format!("cannot serialize search body: {e}"))
            })?;
            out.push(b'\n');
        }
    }
    Ok(Bytes::from(out))
}

/// Signs every batch with fresh credentials and posts it to the backend.
pub struct SigningTransporter {
    client: reqwest::Client,
    endpoint: Url,
    hostname: String,
    region: String,
    service: String,
    credentials: Arc<dyn CredentialSource>,
}

impl SigningTransporter {
    /// Creates a transporter for `config`, resolving credentials from
    /// `credentials` on every call.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Network`] if the HTTP client cannot be built.
    pub fn new(
        config: &BackendConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        let hostname = endpoint
            .host_str()
            .ok_or_else(|| SearchError::Config("backend endpoint must include a host".into()))?
            .to_owned();

        Ok(Self {
            client: build_client(config)?,
            endpoint,
            hostname,
            region: config.region.clone(),
            service: config.service.clone(),
            credentials,
        })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The value sent (and signed) as the `host` header.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

#[async_trait]
impl NetworkRequestPerformer for SigningTransporter {
    async fn perform_network_request(
        &self,
        requests: &[SearchRequest],
    ) -> Result<RawResponse, SearchError> {
        let body = msearch_body(requests)?;
        let envelope = HttpEnvelope::post(self.endpoint.clone(), body)
            .with_header("content-type", "application/json")?
            .with_header("host", &self.hostname)?;

        let credentials = self.credentials.resolve().await?;
        let signed = sign(
            envelope,
            &credentials,
            &SigningParams::now(&self.region, &self.service),
        )?;

        let (method, _, headers, body) = signed.into_parts();
        tracing::debug!(
            endpoint = %self.endpoint,
            batch = requests.len(),
            bytes = body.len(),
            "sending signed search batch"
        );

        // Sent to the configured URL, not one rebuilt from the signed envelope.
        let response = self
            .client
            .request(method, self.endpoint.as_str())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::Network(format!("backend request failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::Network(format!("failed to read backend response: {e}")))?;

        if status.is_success() {
            tracing::debug!(%status, bytes = body.len(), "backend responded");
        } else {
            tracing::warn!(%status, "backend returned an error status, passing it through");
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
