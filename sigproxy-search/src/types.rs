//! Core types shared by the orchestration client, hooks and transport.
//!
//! UI-facing types use the InstantSearch wire names (`indexName`,
//! `hitsPerPage`, `nbHits`, ...). Backend-facing types carry raw JSON
//! documents because the query body is an arbitrary nested structure.

use std::collections::BTreeMap;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default page size when the UI does not send `hitsPerPage`.
pub const DEFAULT_HITS_PER_PAGE: u32 = 20;

/// One backend search in a batch.
///
/// Built by the orchestration client from a [`UiSearchRequest`]; hooks may
/// replace the whole batch before it reaches the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Index (or collection) the query targets.
    pub index_name: String,
    /// Backend-native query document (`query`, `from`, `size`, `aggs`, ...).
    pub body: Value,
    /// Request metadata kept alongside the body for response translation.
    pub meta: RequestMeta,
}

impl SearchRequest {
    /// The `query` clause of the body, if any.
    pub fn query(&self) -> Option<&Value> {
        self.body.get("query")
    }
}

/// Pagination and facet metadata for a [`SearchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestMeta {
    /// The user's query text.
    pub query: String,
    /// Zero-based page number.
    pub page: u32,
    /// Page size.
    pub hits_per_page: u32,
    /// Facets whose value counts were requested.
    pub facets: Vec<String>,
}

/// One UI search as sent by an InstantSearch-compatible frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSearchRequest {
    /// Target index.
    pub index_name: String,
    /// Search parameters.
    #[serde(default)]
    pub params: UiSearchParams,
}

/// Parameters of a [`UiSearchRequest`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSearchParams {
    /// Query text. Empty or absent matches everything.
    pub query: Option<String>,
    /// Zero-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub hits_per_page: Option<u32>,
    /// Facets to compute value counts for.
    #[serde(deserialize_with = "string_or_seq")]
    pub facets: Vec<String>,
    /// Facet refinements: outer entries are AND-ed, inner lists are OR-ed.
    pub facet_filters: Vec<FacetFilter>,
    /// Tag inserted before highlighted fragments.
    pub highlight_pre_tag: Option<String>,
    /// Tag inserted after highlighted fragments.
    pub highlight_post_tag: Option<String>,
}

/// A single facet refinement entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetFilter {
    /// `"attribute:value"`, or `"-attribute:value"` for exclusion.
    Single(String),
    /// Any of the listed refinements.
    AnyOf(Vec<String>),
}

/// Response returned to the UI.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// One result set per backend request, in request order.
    pub results: Vec<SearchResults>,
}

/// Result set for one backend request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Index the results came from.
    pub index: String,
    /// The query text that produced these results.
    pub query: String,
    /// Matching documents on this page.
    pub hits: Vec<Value>,
    /// Total number of matching documents.
    pub nb_hits: u64,
    /// Zero-based page number.
    pub page: u32,
    /// Total number of pages.
    pub nb_pages: u64,
    /// Page size.
    pub hits_per_page: u32,
    /// Backend processing time in milliseconds.
    #[serde(rename = "processingTimeMS")]
    pub processing_time_ms: u64,
    /// Always true; totals come straight from the backend.
    pub exhaustive_nb_hits: bool,
    /// Facet value counts keyed by facet name then value.
    pub facets: BTreeMap<String, BTreeMap<String, u64>>,
}

/// The backend's reply, fully read but otherwise uninterpreted.
///
/// The transport never inspects `status`: a 4xx/5xx reply is returned as
/// successfully as a 200.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status returned by the backend.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body bytes.
    pub body: Bytes,
}

impl RawResponse {
    /// Builds a response with no headers; convenient for fakes.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Parses the body as JSON, returning `None` if it is not valid JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

fn string_or_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
