//! Translation of backend multi-search replies into UI result sets.
//!
//! Translation is lenient by policy: the backend's status code is never
//! inspected, so error bodies, non-JSON bodies and missing fields all
//! translate to empty result sets rather than failures.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::config::SearchSettings;
use crate::types::{RawResponse, SearchRequest, SearchResults};

/// Splits a multi-search reply into one JSON value per request.
///
/// Always returns exactly `expected` values; missing entries are `Null`.
pub fn backend_responses(raw: &RawResponse, expected: usize) -> Vec<Value> {
    let mut responses = match raw.json() {
        Some(Value::Object(mut body)) => match body.remove("responses") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!(status = %raw.status, "backend reply has no responses array");
                Vec::new()
            }
        },
        Some(_) => {
            tracing::warn!(status = %raw.status, "backend reply is not a JSON object");
            Vec::new()
        }
        None => {
            tracing::warn!(
                status = %raw.status,
                bytes = raw.body.len(),
                "backend reply is not JSON"
            );
            Vec::new()
        }
    };
    responses.resize(expected, Value::Null);
    responses
}

/// Translates one backend response into the UI result shape.
pub fn translate_results(
    request: &SearchRequest,
    response: &Value,
    settings: &SearchSettings,
) -> SearchResults {
    let raw_hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let hits: Vec<Value> = raw_hits
        .iter()
        .map(|hit| translate_hit(hit, settings))
        .collect();

    let nb_hits = total_hits(response).unwrap_or(hits.len() as u64);
    let hits_per_page = request.meta.hits_per_page;
    let nb_pages = if hits_per_page == 0 {
        0
    } else {
        nb_hits.div_ceil(u64::from(hits_per_page))
    };

    SearchResults {
        index: request.index_name.clone(),
        query: request.meta.query.clone(),
        hits,
        nb_hits,
        page: request.meta.page,
        nb_pages,
        hits_per_page,
        processing_time_ms: response.get("took").and_then(Value::as_u64).unwrap_or(0),
        exhaustive_nb_hits: true,
        facets: facet_counts(response, &request.meta.facets),
    }
}

/// `hits.total.value` (newer backends) or numeric `hits.total` (older ones).
fn total_hits(response: &Value) -> Option<u64> {
    let total = response.pointer("/hits/total")?;
    total
        .get("value")
        .and_then(Value::as_u64)
        .or_else(|| total.as_u64())
}

fn translate_hit(hit: &Value, settings: &SearchSettings) -> Value {
    let mut out = match hit.get("_source") {
        Some(Value::Object(source)) => source.clone(),
        _ => Map::new(),
    };

    let id = match hit.get("_id") {
        Some(Value::String(id)) => Value::String(id.clone()),
        Some(Value::Number(n)) => Value::String(n.to_string()),
        _ => Value::Null,
    };
    out.insert("objectID".into(), id);

    let mut highlights = Map::new();
    for attribute in &settings.highlight_attributes {
        let fragments = hit
            .pointer(&format!("/highlight/{}", escape_pointer(attribute)))
            .and_then(Value::as_array);
        let entry = match fragments {
            Some(fragments) => {
                let joined: Vec<&str> = fragments.iter().filter_map(Value::as_str).collect();
                json!({ "value": joined.join(" "), "matchLevel": "full", "matchedWords": [] })
            }
            None => match out.get(attribute).and_then(Value::as_str) {
                Some(plain) => json!({ "value": plain, "matchLevel": "none", "matchedWords": [] }),
                None => continue,
            },
        };
        highlights.insert(attribute.clone(), entry);
    }
    if !highlights.is_empty() {
        out.insert("_highlightResult".into(), Value::Object(highlights));
    }

    Value::Object(out)
}

fn facet_counts(response: &Value, facets: &[String]) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut counts = BTreeMap::new();
    for facet in facets {
        let buckets = response
            .get("aggregations")
            .and_then(|aggs| aggs.get(facet))
            .and_then(|agg| agg.get("buckets"))
            .and_then(Value::as_array);
        let Some(buckets) = buckets else {
            continue;
        };

        let values: BTreeMap<String, u64> = buckets
            .iter()
            .filter_map(|bucket| {
                let key = match bucket.get("key")? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
                Some((key, count))
            })
            .collect();
        counts.insert(facet.clone(), values);
    }
    counts
}

/// JSON pointer escaping (RFC 6901) for a single reference token.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
