//! Translation of UI search requests into backend query bodies.
//!
//! ```text
//! query text  → match_all (empty) | multi_match over search_attributes
//! facetFilters → bool.filter (outer AND, inner OR via bool.should)
//! page/size   → from/size
//! facets      → terms aggregations (configured facet attributes only)
//! ```

use serde_json::{json, Map, Value};

use crate::config::SearchSettings;
use crate::types::{
    FacetFilter, RequestMeta, SearchRequest, UiSearchRequest, DEFAULT_HITS_PER_PAGE,
};

/// Number of buckets requested per facet aggregation.
pub const FACET_BUCKETS: u32 = 10;

const DEFAULT_PRE_TAG: &str = "<em>";
const DEFAULT_POST_TAG: &str = "</em>";

/// Builds the backend request for one UI request.
pub fn build_search_request(ui: &UiSearchRequest, settings: &SearchSettings) -> SearchRequest {
    let params = &ui.params;
    let text = params.query.as_deref().unwrap_or_default().trim().to_owned();
    let page = params.page.unwrap_or(0);
    let size = params.hits_per_page.unwrap_or(DEFAULT_HITS_PER_PAGE);
    let facets = requested_facets(&params.facets, settings);

    let mut body = Map::new();
    body.insert(
        "query".into(),
        query_clause(&text, &params.facet_filters, settings),
    );
    body.insert("from".into(), json!(u64::from(page) * u64::from(size)));
    body.insert("size".into(), json!(size));

    if !settings.result_attributes.is_empty() {
        body.insert(
            "_source".into(),
            json!({ "includes": settings.result_attributes }),
        );
    }

    if !settings.highlight_attributes.is_empty() {
        let fields: Map<String, Value> = settings
            .highlight_attributes
            .iter()
            .map(|attr| (attr.clone(), json!({ "number_of_fragments": 0 })))
            .collect();
        body.insert(
            "highlight".into(),
            json!({
                "pre_tags": [params.highlight_pre_tag.as_deref().unwrap_or(DEFAULT_PRE_TAG)],
                "post_tags": [params.highlight_post_tag.as_deref().unwrap_or(DEFAULT_POST_TAG)],
                "fields": fields,
            }),
        );
    }

    if !facets.is_empty() {
        let aggs: Map<String, Value> = facets
            .iter()
            .map(|facet| {
                (
                    facet.clone(),
                    json!({ "terms": { "field": facet, "size": FACET_BUCKETS } }),
                )
            })
            .collect();
        body.insert("aggs".into(), Value::Object(aggs));
    }

    tracing::trace!(index = %ui.index_name, query = %text, page, size, "built search request");

    SearchRequest {
        index_name: ui.index_name.clone(),
        body: Value::Object(body),
        meta: RequestMeta {
            query: text,
            page,
            hits_per_page: size,
            facets,
        },
    }
}

/// The text clause, wrapped in a `bool` with filters when refinements exist.
fn query_clause(text: &str, filters: &[FacetFilter], settings: &SearchSettings) -> Value {
    let text_clause = if text.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({
            "multi_match": {
                "query": text,
                "fields": settings.search_attributes,
            }
        })
    };

    let filter_clauses: Vec<Value> = filters.iter().filter_map(filter_clause).collect();
    if filter_clauses.is_empty() {
        return text_clause;
    }

    json!({
        "bool": {
            "must": [text_clause],
            "filter": filter_clauses,
        }
    })
}

fn filter_clause(filter: &FacetFilter) -> Option<Value> {
    match filter {
        FacetFilter::Single(refinement) => refinement_clause(refinement),
        FacetFilter::AnyOf(refinements) => {
            let should: Vec<Value> = refinements
                .iter()
                .filter_map(|r| refinement_clause(r))
                .collect();
            if should.is_empty() {
                return None;
            }
            Some(json!({ "bool": { "should": should, "minimum_should_match": 1 } }))
        }
    }
}

/// `attr:value` → term; `-attr:value` → negated term. Anything else is skipped.
fn refinement_clause(refinement: &str) -> Option<Value> {
    let (negated, rest) = match refinement.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, refinement),
    };
    let Some((attribute, value)) = rest.split_once(':') else {
        tracing::debug!(%refinement, "ignoring facet filter without attribute:value form");
        return None;
    };
    if attribute.is_empty() {
        return None;
    }

    let mut term = Map::new();
    term.insert(attribute.to_owned(), json!(value));
    let clause = json!({ "term": term });
    Some(if negated {
        json!({ "bool": { "must_not": clause } })
    } else {
        clause
    })
}

/// Requested facets restricted to configured ones; `*` selects them all.
fn requested_facets(requested: &[String], settings: &SearchSettings) -> Vec<String> {
    if requested.iter().any(|f| f == "*") {
        return settings.facet_attributes.clone();
    }
    let mut facets: Vec<String> = Vec::new();
    for facet in requested {
        if settings.is_facet(facet) && !facets.contains(facet) {
            facets.push(facet.clone());
        }
    }
    facets
}
