//! Relevance boosting applied to outgoing searches.
//!
//! [`QueryAugmentor`] wraps the query clause of the outgoing request in a
//! `function_score` construct carrying one [`BoostRule`]. With the default
//! rule, documents whose `type` is `"ecommerce"` are rescored as
//!
//! ```text
//! new_score = _score * (5 + 0.17 * doc['score'].value)
//! ```
//!
//! The wrap is not idempotent: augmenting an already-augmented request nests
//! a second `function_score` layer. The client runs the hook once per
//! request, so this never happens in normal operation.

use serde_json::{json, Map, Value};

use crate::orchestrator::hooks::BeforeSearchHook;
use crate::types::SearchRequest;

/// A filtered script-score function compiled into every outgoing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostRule {
    /// Document field the filter matches on.
    pub filter_field: String,
    /// Literal the filter field must match.
    pub filter_value: String,
    /// Painless script computing the new score.
    pub script: String,
}

impl BoostRule {
    /// A rule that rescales `_score` by `offset + factor * doc[score_field]`
    /// for documents where `filter_field` matches `filter_value`.
    pub fn affine(
        filter_field: impl Into<String>,
        filter_value: impl Into<String>,
        offset: f64,
        factor: f64,
        score_field: &str,
    ) -> Self {
        Self {
            filter_field: filter_field.into(),
            filter_value: filter_value.into(),
            script: format!("_score * ({offset} + ({factor} * doc['{score_field}'].value))"),
        }
    }

    /// The `function_score` function object for this rule.
    pub fn function(&self) -> Value {
        let mut matcher = Map::new();
        matcher.insert(
            self.filter_field.clone(),
            json!({ "query": self.filter_value }),
        );
        json!({
            "filter": { "bool": { "must": { "match": matcher } } },
            "script_score": { "script": self.script },
        })
    }

    /// Wraps `query` so this rule rescales its matches.
    pub fn wrap(&self, query: Value) -> Value {
        json!({
            "function_score": {
                "query": query,
                "functions": [self.function()],
            }
        })
    }
}

impl Default for BoostRule {
    fn default() -> Self {
        Self::affine("type", "ecommerce", 5.0, 0.17, "score")
    }
}

/// Before-search hook that boosts the outgoing query with a [`BoostRule`].
#[derive(Debug, Clone, Default)]
pub struct QueryAugmentor {
    rule: BoostRule,
}

impl QueryAugmentor {
    /// Augmentor applying `rule`.
    pub fn new(rule: BoostRule) -> Self {
        Self { rule }
    }

    /// The rule being applied.
    pub fn rule(&self) -> &BoostRule {
        &self.rule
    }

    /// Rewrites the first request's query clause and returns it as the whole
    /// new batch. Requests after the first are dropped; an empty batch stays
    /// empty.
    ///
    /// Every body property other than `query` is carried over unchanged. A
    /// missing or non-object query is wrapped as `{}`.
    pub fn augment(&self, requests: Vec<SearchRequest>) -> Vec<SearchRequest> {
        let Some(first) = requests.into_iter().next() else {
            return Vec::new();
        };

        let mut body = match first.body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let original = body
            .remove("query")
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));
        body.insert("query".into(), self.rule.wrap(original));

        vec![SearchRequest {
            body: Value::Object(body),
            ..first
        }]
    }
}

impl BeforeSearchHook for QueryAugmentor {
    fn before_search(&self, requests: Vec<SearchRequest>) -> Vec<SearchRequest> {
        let dropped = requests.len().saturating_sub(1);
        if dropped > 0 {
            tracing::debug!(dropped, "query augmentor keeps only the first request");
        }
        self.augment(requests)
    }
}
