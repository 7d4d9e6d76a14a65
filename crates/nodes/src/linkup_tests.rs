//! Tests for the Linkup node: routing, body building and the transport call.
//!
//! These use `MockHttp` so no network is touched. Tests against a real HTTP
//! server live in `client_tests.rs`.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::description::{OPERATION_FIELD, RESOURCE_FIELD};
use crate::http::HttpMethod;
use crate::linkup::{linkup_description, LinkupNode, LINKUP_BASE_URL, LINKUP_NODE};
use crate::mock::MockHttp;
use crate::registry::builtin_registry;
use crate::schema::{validate_schema, ParameterBag};
use crate::traits::{ExecutableNode, ExecutionContext};
use crate::{HttpError, NodeError};

fn bag(value: Value) -> ParameterBag {
    ParameterBag::try_from(value).expect("parameters must be an object")
}

fn body_for(params: Value) -> Result<Value, NodeError> {
    let request = linkup_description(LINKUP_BASE_URL).build_request(bag(params))?;
    Ok(Value::Object(request.body))
}

fn visible_names(params: Value) -> Vec<&'static str> {
    let description = linkup_description(LINKUP_BASE_URL);
    let names: Vec<&'static str> = description
        .visible_fields(bag(params))
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    names
}

// ============================================================
// Request body building (no transport)
// ============================================================

#[test]
fn default_search_sends_only_required_keys() {
    let body = body_for(json!({ "resource": "search", "q": "latest AI news" })).unwrap();
    assert_eq!(
        body,
        json!({ "q": "latest AI news", "depth": "standard", "outputType": "sourcedAnswer" })
    );
}

#[test]
fn resource_defaults_to_search() {
    let request = linkup_description(LINKUP_BASE_URL)
        .build_request(bag(json!({ "q": "rust" })))
        .unwrap();
    assert_eq!(request.resource, "search");
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/search");
}

#[test]
fn fetch_sends_every_boolean_once_an_option_is_set() {
    let request = linkup_description(LINKUP_BASE_URL)
        .build_request(bag(json!({
            "resource": "fetch",
            "url": "https://example.com",
            "options": { "renderJs": true }
        })))
        .unwrap();

    assert_eq!(request.path, "/fetch");
    assert_eq!(
        Value::Object(request.body),
        json!({
            "url": "https://example.com",
            "includeRawHtml": false,
            "renderJs": true,
            "extractImages": false
        })
    );
}

#[test]
fn fetch_without_options_sends_only_url() {
    let body = body_for(json!({ "resource": "fetch", "url": "https://example.com" })).unwrap();
    assert_eq!(body, json!({ "url": "https://example.com" }));
}

#[test]
fn search_filters_are_mapped() {
    let body = body_for(json!({
        "q": "rust",
        "options": {
            "excludeDomains": "a.com, b.com",
            "includeDomains": "",
            "fromDate": "2024-03-01T00:00:00Z",
            "toDate": ""
        }
    }))
    .unwrap();

    assert_eq!(body["excludeDomains"], json!(["a.com", "b.com"]));
    assert_eq!(body["fromDate"], json!("2024-03-01"));
    assert!(body.get("includeDomains").is_none());
    assert!(body.get("toDate").is_none());
    // Visible booleans are explicit once the collection is in use.
    assert_eq!(body["includeImages"], json!(false));
    assert_eq!(body["includeInlineCitations"], json!(false));
    assert!(body.get("includeSources").is_none());
}

#[test]
fn structured_output_requires_a_schema() {
    for schema in [Value::Null, json!(""), json!("{}")] {
        let mut params = json!({ "q": "who", "outputType": "structured" });
        if !schema.is_null() {
            params["structuredOutputSchema"] = schema;
        }
        let err = body_for(params).unwrap_err();
        assert!(
            matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "structuredOutputSchema"),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn structured_output_sends_parsed_schema_and_sources_flag() {
    let body = body_for(json!({
        "q": "who founded rust",
        "outputType": "structured",
        "structuredOutputSchema": r#"{"type":"object","properties":{"name":{"type":"string"}}}"#,
        "options": { "includeSources": true, "includeInlineCitations": true }
    }))
    .unwrap();

    assert_eq!(body["outputType"], json!("structured"));
    assert_eq!(body["structuredOutputSchema"]["type"], json!("object"));
    assert_eq!(body["includeSources"], json!(true));
    assert!(body.get("includeInlineCitations").is_none());
}

#[test]
fn schema_is_ignored_unless_structured() {
    let body = body_for(json!({
        "q": "rust",
        "outputType": "searchResults",
        "structuredOutputSchema": "{ not even json"
    }))
    .unwrap();
    assert!(body.get("structuredOutputSchema").is_none());
}

#[test]
fn citation_and_sources_visibility_are_exclusive() {
    let answer = visible_names(json!({ "outputType": "sourcedAnswer" }));
    assert!(answer.contains(&"includeInlineCitations"));
    assert!(!answer.contains(&"includeSources"));
    assert!(!answer.contains(&"structuredOutputSchema"));

    let structured = visible_names(json!({ "outputType": "structured" }));
    assert!(structured.contains(&"includeSources"));
    assert!(structured.contains(&"structuredOutputSchema"));
    assert!(!structured.contains(&"includeInlineCitations"));

    let results = visible_names(json!({ "outputType": "searchResults" }));
    assert!(!results.contains(&"includeSources"));
    assert!(!results.contains(&"includeInlineCitations"));
}

#[test]
fn fetch_fields_are_hidden_for_search() {
    let names = visible_names(json!({ "resource": "search" }));
    assert!(names.contains(&"q"));
    assert!(!names.contains(&"url"));
    assert!(!names.contains(&"renderJs"));

    let names = visible_names(json!({ "resource": "fetch" }));
    assert_eq!(
        names,
        vec![RESOURCE_FIELD, OPERATION_FIELD, "url", "options", "includeRawHtml", "renderJs", "extractImages"]
    );
}

#[test]
fn blank_required_fields_are_rejected() {
    let err = body_for(json!({ "q": "  " })).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "q"));

    let err = body_for(json!({ "resource": "fetch" })).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "url"));
}

#[test]
fn values_outside_the_option_list_are_rejected() {
    let err = body_for(json!({ "q": "rust", "depth": "shallow" })).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "depth"));

    let err = body_for(json!({ "resource": "images", "q": "rust" })).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "resource"));
}

#[test]
fn unknown_operation_is_rejected() {
    let err = body_for(json!({ "resource": "fetch", "operation": "search", "url": "https://x" })).unwrap_err();
    assert!(matches!(
        err,
        NodeError::UnknownOperation { ref resource, ref operation } if resource == "fetch" && operation == "search"
    ));
}

#[test]
fn unknown_options_are_rejected() {
    let err = body_for(json!({ "q": "rust", "options": { "safeSearch": true } })).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "options.safeSearch"));
}

#[test]
fn malformed_dates_are_rejected() {
    let err = body_for(json!({ "q": "rust", "options": { "toDate": "last week" } })).unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "toDate"));
}

// ============================================================
// Description invariants
// ============================================================

#[test]
fn shipped_description_only_gates_on_earlier_fields() {
    let description = linkup_description(LINKUP_BASE_URL);
    validate_schema(&description.properties).expect("visibility must reference earlier fields");
}

#[test]
fn resource_field_namespaces_are_disjoint() {
    let description = linkup_description(LINKUP_BASE_URL);
    let ops = description.operations();
    assert_eq!(ops.len(), 2);

    let names = |idx: usize| -> HashSet<&'static str> {
        let mut out = HashSet::new();
        for f in &ops[idx].fields {
            out.insert(f.name);
            out.extend(f.fields.iter().map(|c| c.name));
        }
        out
    };
    let shared: Vec<_> = names(0).intersection(&names(1)).copied().collect();
    assert_eq!(shared, vec!["options"]);
}

#[test]
fn description_serializes_like_a_manifest() {
    let description = linkup_description(LINKUP_BASE_URL);
    let manifest = serde_json::to_value(&description).unwrap();

    assert_eq!(manifest["name"], "linkup");
    assert_eq!(manifest["requestDefaults"]["baseURL"], LINKUP_BASE_URL);
    assert_eq!(manifest["credentials"][0], json!({ "name": "linkupApi", "required": true }));
    assert_eq!(manifest["properties"][0]["name"], "resource");
    assert_eq!(manifest["properties"][1]["options"][0]["request"], json!({ "method": "POST", "url": "/search" }));
    assert_eq!(description.subtitle("search", "search"), "search: search");
}

// ============================================================
// Node execution through the mock helper
// ============================================================

#[tokio::test]
async fn node_posts_body_through_linkup_credential() {
    let mock = Arc::new(MockHttp::returning(json!({ "answer": "42", "sources": [] })));
    let ctx = ExecutionContext::standalone(mock.clone());

    let out = LinkupNode::new()
        .execute(json!({ "resource": "search", "q": "latest AI news" }), &ctx)
        .await
        .unwrap();

    assert_eq!(out, json!({ "answer": "42", "sources": [] }));
    assert_eq!(mock.call_count(), 1);

    let call = mock.last_call().unwrap();
    assert_eq!(call.credential_type, "linkupApi");
    assert_eq!(call.options.method, HttpMethod::Post);
    assert_eq!(call.options.url, "https://api.linkup.so/v1/search");
    assert!(call.options.json);
    assert!(call.options.qs.is_empty());
    assert_eq!(
        call.options.headers,
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    );
    assert_eq!(
        call.options.body,
        Some(json!({ "q": "latest AI news", "depth": "standard", "outputType": "sourcedAnswer" }))
    );
}

#[tokio::test]
async fn invalid_parameters_never_reach_the_network() {
    let mock = Arc::new(MockHttp::returning(Value::Null));
    let ctx = ExecutionContext::standalone(mock.clone());

    let err = LinkupNode::new()
        .execute(json!({ "q": "x", "outputType": "structured" }), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, NodeError::InvalidParameter { .. }));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn remote_errors_pass_through_unchanged() {
    let mock = Arc::new(MockHttp::failing_status(400, json!({ "error": "bad schema" })));
    let ctx = ExecutionContext::standalone(mock.clone());

    let err = LinkupNode::new()
        .execute(json!({ "resource": "fetch", "url": "https://example.com" }), &ctx)
        .await
        .unwrap_err();

    match err {
        NodeError::Http(HttpError::Status { status, body, url, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(body, json!({ "error": "bad schema" }));
            assert_eq!(url, "https://api.linkup.so/v1/fetch");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(mock.call_count(), 1, "no retries");
}

#[tokio::test]
async fn non_object_parameters_are_rejected() {
    let mock = Arc::new(MockHttp::returning(Value::Null));
    let ctx = ExecutionContext::standalone(mock.clone());
    let err = LinkupNode::new().execute(json!("search"), &ctx).await.unwrap_err();
    assert!(matches!(err, NodeError::InvalidParameter { ref field, .. } if field == "parameters"));
}

#[tokio::test]
async fn registry_dispatches_linkup() {
    let registry = builtin_registry();
    let node = registry.get(LINKUP_NODE).expect("linkup must be registered");

    let mock = Arc::new(MockHttp::failing_transport("connection reset"));
    let ctx = ExecutionContext::standalone(mock.clone());
    let err = node.execute(json!({ "q": "rust" }), &ctx).await.unwrap_err();
    assert!(matches!(err, NodeError::Http(HttpError::Transport { .. })));
}
