//! `ReqwestHelpers` against an in-process axum server standing in for the
//! Linkup API.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::client::{ClientConfig, ReqwestHelpers};
use crate::credentials::{CredentialData, LinkupApi};
use crate::linkup::LinkupNode;
use crate::traits::{ExecutableNode, ExecutionContext};
use crate::{HttpError, NodeError};

const GOOD_KEY: &str = "sk-good";

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| Value::String(s.to_string()))
        .unwrap_or(Value::Null)
}

async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "authorization": header(&headers, "authorization"),
        "accept": header(&headers, "accept"),
        "acceptCount": headers.get_all("accept").iter().count(),
        "contentType": header(&headers, "content-type"),
        "received": body,
    }))
}

async fn balance(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if header(&headers, "authorization") == json!(format!("Bearer {GOOD_KEY}")) {
        (StatusCode::OK, Json(json!({ "balance": 42.5 })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": "UNAUTHORIZED", "message": "Invalid API key" } })),
        )
    }
}

/// Start a fake API and return its `/v1` root.
async fn spawn_api() -> String {
    let app = Router::new()
        .route("/v1/search", post(echo))
        .route("/v1/fetch", post(echo))
        .route("/v1/credits/balance", get(balance));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn helpers(base_url: &str, key: &str) -> ReqwestHelpers {
    ReqwestHelpers::new(ClientConfig::default())
        .unwrap()
        .register(Arc::new(LinkupApi::with_base_url(base_url)))
        .with_credentials("linkupApi", CredentialData::default().with("apiKey", key))
}

#[tokio::test]
async fn search_sends_bearer_header_and_json_body() {
    let base = spawn_api().await;
    let ctx = ExecutionContext::standalone(Arc::new(helpers(&base, GOOD_KEY)));

    let out = LinkupNode::with_base_url(&base)
        .execute(json!({ "q": "latest AI news" }), &ctx)
        .await
        .unwrap();

    assert_eq!(out["authorization"], "Bearer sk-good");
    assert_eq!(out["accept"], "application/json");
    assert_eq!(out["acceptCount"], 1);
    assert_eq!(out["contentType"], "application/json");
    assert_eq!(
        out["received"],
        json!({ "q": "latest AI news", "depth": "standard", "outputType": "sourcedAnswer" })
    );
}

#[tokio::test]
async fn fetch_round_trips_through_the_server() {
    let base = spawn_api().await;
    let ctx = ExecutionContext::standalone(Arc::new(helpers(&base, GOOD_KEY)));

    let out = LinkupNode::with_base_url(&base)
        .execute(
            json!({ "resource": "fetch", "url": "https://example.com", "options": { "renderJs": true } }),
            &ctx,
        )
        .await
        .unwrap();

    assert_eq!(
        out["received"],
        json!({ "url": "https://example.com", "includeRawHtml": false, "renderJs": true, "extractImages": false })
    );
}

#[tokio::test]
async fn credential_test_accepts_a_good_key() {
    let base = spawn_api().await;
    helpers(&base, GOOD_KEY).test_credential("linkupApi").await.unwrap();
}

#[tokio::test]
async fn credential_test_surfaces_401_verbatim() {
    let base = spawn_api().await;
    let err = helpers(&base, "sk-bad").test_credential("linkupApi").await.unwrap_err();

    match err {
        NodeError::CredentialInvalid { credential, source } => {
            assert_eq!(credential, "linkupApi");
            assert_eq!(source.status(), Some(401));
            match source {
                HttpError::Status { body, method, .. } => {
                    assert_eq!(method, "GET");
                    assert_eq!(body["error"]["message"], "Invalid API key");
                }
                other => panic!("unexpected source: {other}"),
            }
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_credentials_fail_before_sending() {
    let base = spawn_api().await;
    let helpers = ReqwestHelpers::new(ClientConfig::default())
        .unwrap()
        .register(Arc::new(LinkupApi::with_base_url(&base)));
    let ctx = ExecutionContext::standalone(Arc::new(helpers));

    let err = LinkupNode::with_base_url(&base)
        .execute(json!({ "q": "rust" }), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Http(HttpError::MissingCredentials(ref n)) if n == "linkupApi"));
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = format!("http://{addr}/v1");

    let ctx = ExecutionContext::standalone(Arc::new(helpers(&base, GOOD_KEY)));
    let err = LinkupNode::with_base_url(&base)
        .execute(json!({ "q": "rust" }), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Http(HttpError::Transport { .. })));
}
