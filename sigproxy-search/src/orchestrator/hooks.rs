//! Request lifecycle hooks.
//!
//! A before-search hook receives the batch the client built and returns the
//! batch that is actually sent: the returned list replaces the original
//! entirely. An after-search hook sees the raw per-request backend
//! responses before they are translated for the UI.

use std::sync::Arc;

use serde_json::Value;

use crate::types::SearchRequest;

/// Rewrites the outgoing batch before transport.
pub trait BeforeSearchHook: Send + Sync {
    /// Returns the batch to send in place of `requests`.
    fn before_search(&self, requests: Vec<SearchRequest>) -> Vec<SearchRequest>;
}

impl<F> BeforeSearchHook for F
where
    F: Fn(Vec<SearchRequest>) -> Vec<SearchRequest> + Send + Sync,
{
    fn before_search(&self, requests: Vec<SearchRequest>) -> Vec<SearchRequest> {
        self(requests)
    }
}

/// Inspects or rewrites raw backend responses before translation.
pub trait AfterSearchHook: Send + Sync {
    /// Returns the responses to translate; one per entry of `requests`.
    fn after_search(&self, requests: &[SearchRequest], responses: Vec<Value>) -> Vec<Value>;
}

impl<F> AfterSearchHook for F
where
    F: Fn(&[SearchRequest], Vec<Value>) -> Vec<Value> + Send + Sync,
{
    fn after_search(&self, requests: &[SearchRequest], responses: Vec<Value>) -> Vec<Value> {
        self(requests, responses)
    }
}

/// Hooks passed to [`SearchClient::handle_request`](super::SearchClient::handle_request).
#[derive(Clone, Default)]
pub struct SearchHooks {
    before_search: Option<Arc<dyn BeforeSearchHook>>,
    after_search: Option<Arc<dyn AfterSearchHook>>,
}

impl SearchHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the before-search hook.
    pub fn with_before_search(mut self, hook: impl BeforeSearchHook + 'static) -> Self {
        self.before_search = Some(Arc::new(hook));
        self
    }

    /// Sets the after-search hook.
    pub fn with_after_search(mut self, hook: impl AfterSearchHook + 'static) -> Self {
        self.after_search = Some(Arc::new(hook));
        self
    }

    pub(crate) fn run_before_search(&self, requests: Vec<SearchRequest>) -> Vec<SearchRequest> {
        match &self.before_search {
            Some(hook) => hook.before_search(requests),
            None => requests,
        }
    }

    pub(crate) fn run_after_search(
        &self,
        requests: &[SearchRequest],
        responses: Vec<Value>,
    ) -> Vec<Value> {
        match &self.after_search {
            Some(hook) => hook.after_search(requests, responses),
            None => responses,
        }
    }
}

impl std::fmt::Debug for SearchHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHooks")
            .field("before_search", &self.before_search.is_some())
            .field("after_search", &self.after_search.is_some())
            .finish()
    }
}
