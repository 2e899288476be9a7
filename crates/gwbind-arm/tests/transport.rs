use std::sync::Arc;
use std::time::Duration;

use assert_json_diff::assert_json_include;
use gwbind_arm::{ArmConfig, ArmTransport, StaticToken};
use gwbind_core::{
    BindingError, BindingReconciler, BindingState, Collection, GatewayDocument, GatewayRef,
    GatewayTransport, TransportError,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GATEWAY_PATH: &str = "/subscriptions/sub-1/resourceGroups/rg-web/providers/Microsoft.Network/applicationGateways/agw-prod";

fn gateway() -> GatewayRef {
    GatewayRef::new("sub-1", "rg-web", "agw-prod")
}

fn document_json() -> Value {
    json!({
        "name": "agw-prod",
        "etag": "W/\"abc\"",
        "location": "westeurope",
        "properties": {
            "probes": [{ "name": "legacy-probe", "properties": { "path": "/" } }]
        }
    })
}

fn transport(server: &MockServer, conditional_writes: bool) -> ArmTransport {
    let config = ArmConfig {
        endpoint: server.uri(),
        api_version: "2023-09-01".to_string(),
        timeout: Duration::from_secs(5),
        conditional_writes,
    };
    ArmTransport::new(config, Arc::new(StaticToken::new("token-1"))).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_bearer_and_api_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GATEWAY_PATH))
        .and(query_param("api-version", "2023-09-01"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json()))
        .expect(1)
        .mount(&server)
        .await;

    let doc = transport(&server, false).fetch(&gateway()).await.unwrap();
    assert_eq!(doc.name(), Some("agw-prod"));
    assert_eq!(doc.etag(), Some("W/\"abc\""));
    assert!(doc.exists(Collection::Probes, "legacy-probe"));
}

#[tokio::test]
async fn test_fetch_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "ResourceNotFound" }
        })))
        .mount(&server)
        .await;

    let err = transport(&server, false).fetch(&gateway()).await.unwrap_err();
    assert!(matches!(err, TransportError::NotFound(_)));
}

#[tokio::test]
async fn test_fetch_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let err = transport(&server, false).fetch(&gateway()).await.unwrap_err();
    assert!(matches!(err, TransportError::Auth(_)));
}

#[tokio::test]
async fn test_fetch_server_error_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let err = transport(&server, false).fetch(&gateway()).await.unwrap_err();
    match err {
        TransportError::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "try later");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = transport(&server, false).fetch(&gateway()).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn test_replace_puts_whole_document() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(GATEWAY_PATH))
        .and(query_param("api-version", "2023-09-01"))
        .and(body_partial_json(json!({ "location": "westeurope" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json()))
        .expect(1)
        .mount(&server)
        .await;

    let doc = GatewayDocument::from_value(document_json()).unwrap();
    let response = transport(&server, false)
        .replace(&gateway(), &doc)
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(response.document, Some(doc));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("If-Match").is_none());
}

#[tokio::test]
async fn test_conditional_replace_sends_if_match() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header("If-Match", "W/\"abc\""))
        .respond_with(ResponseTemplate::new(412).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let doc = GatewayDocument::from_value(document_json()).unwrap();
    let response = transport(&server, true)
        .replace(&gateway(), &doc)
        .await
        .unwrap();
    assert_eq!(response.status, 412);
    assert!(response.document.is_none());
}

#[tokio::test]
async fn test_replace_rejection_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "InvalidResourceReference", "message": "listener missing" }
        })))
        .mount(&server)
        .await;

    let doc = GatewayDocument::from_value(document_json()).unwrap();
    let response = transport(&server, false)
        .replace(&gateway(), &doc)
        .await
        .unwrap();
    assert_eq!(response.status, 400);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_json_include!(
        actual: body,
        expected: json!({ "error": { "code": "InvalidResourceReference" } })
    );
}

#[tokio::test]
async fn test_connection_failure_is_request_error() {
    let config = ArmConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        ..ArmConfig::default()
    };
    let transport = ArmTransport::new(config, Arc::new(StaticToken::new("t"))).unwrap();
    let err = transport.fetch(&gateway()).await.unwrap_err();
    assert!(matches!(err, TransportError::Request { .. }));
}

#[tokio::test]
async fn test_delete_through_reconciler_submits_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json()))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = BindingReconciler::new(transport(&server, false));
    let prior = BindingState::empty("gone", gateway());
    reconciler.delete(&prior).await.unwrap();
}

#[tokio::test]
async fn test_remote_rejection_surfaces_through_reconciler() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document_json()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(409).set_body_string(r#"{"error":{"code":"AnotherOperationInProgress"}}"#))
        .mount(&server)
        .await;

    let reconciler = BindingReconciler::new(transport(&server, false));
    let err = reconciler
        .delete(&BindingState::empty("gone", gateway()))
        .await
        .unwrap_err();
    match err {
        BindingError::RemoteApply { status, body } => {
            assert_eq!(status, 409);
            assert!(body.contains("AnotherOperationInProgress"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
