//! Router-level tests for the CORS edge.
//!
//! The router is driven with `tower::ServiceExt::oneshot`; a wiremock
//! server plays the signed search backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sigproxy::{ProxyConfig, build_client, router};
use sigproxy_search::boosted_hooks;
use sigproxy_search::credentials::{Credentials, StaticCredentials};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn edge(endpoint: String) -> Router {
    let mut config = ProxyConfig::default();
    config.backend.endpoint = endpoint;
    let creds = StaticCredentials::from(Credentials::new("AKIDTEST", "secret"));
    let client = build_client(&config, Arc::new(creds)).expect("client");
    router(Arc::new(client), boosted_hooks())
}

fn search(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn payload() -> String {
    json!([{ "indexName": "products", "params": { "query": "lamp" } }]).to_string()
}

#[tokio::test]
async fn preflight_returns_exactly_three_cors_headers() {
    // No backend call is made, so the endpoint is never contacted.
    let app = edge("http://127.0.0.1:9/_msearch".into());
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/any/path")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers().clone();
    let mut cors: Vec<(&str, &str)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("access-control-"))
        .map(|(name, value)| (name.as_str(), value.to_str().unwrap()))
        .collect();
    cors.sort_unstable();
    assert_eq!(
        cors,
        vec![
            ("access-control-allow-headers", "Content-Type"),
            ("access-control-allow-methods", "GET, POST, OPTIONS"),
            ("access-control-allow-origin", "*"),
        ]
    );
    assert!(headers.get(header::CONTENT_TYPE).is_none());
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn search_returns_json_with_cors_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_msearch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{
                "took": 4,
                "hits": {
                    "total": { "value": 1 },
                    "hits": [{ "_id": "p1", "_source": { "name": "Desk lamp" } }]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = edge(format!("{}/_msearch", server.uri()))
        .oneshot(search(payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "GET, HEAD, POST, OPTIONS"
    );

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["results"][0]["nbHits"], 1);
    assert_eq!(body["results"][0]["hits"][0]["objectID"], "p1");
    assert_eq!(body["results"][0]["processingTimeMS"], 4);
}

#[tokio::test]
async fn outbound_body_is_boosted_and_signed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [{}] })))
        .mount(&server)
        .await;

    let response = edge(format!("{}/_msearch", server.uri()))
        .oneshot(search(payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let request = &received[0];
    assert_eq!(request.headers.get_all("authorization").iter().count(), 1);

    let body = String::from_utf8(request.body.clone()).unwrap();
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some(r#"{"index":"products"}"#));
    let query: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    let function_score = &query["query"]["function_score"];
    assert_eq!(
        function_score["functions"][0]["script_score"]["script"],
        "_score * (5 + (0.17 * doc['score'].value))"
    );
    assert_eq!(
        function_score["functions"][0]["filter"]["bool"]["must"]["match"]["type"]["query"],
        "ecommerce"
    );
    assert_eq!(function_score["query"]["multi_match"]["query"], "lamp");
}

#[tokio::test]
async fn backend_500_still_returns_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .expect(1)
        .mount(&server)
        .await;

    let response = edge(format!("{}/_msearch", server.uri()))
        .oneshot(search(payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["results"][0]["hits"], json!([]));
    assert_eq!(body["results"][0]["nbHits"], 0);
}

#[tokio::test]
async fn malformed_body_is_400_without_cors() {
    let app = edge("http://127.0.0.1:9/_msearch".into());
    let response = app.oneshot(search("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get("access-control-allow-origin").is_none());
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.starts_with("malformed request"));
}

#[tokio::test]
async fn unreachable_backend_is_500_without_cors() {
    let app = edge("http://127.0.0.1:9/_msearch".into());
    let response = app.oneshot(search(payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
