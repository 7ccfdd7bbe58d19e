//! HTTP API endpoint tests over the in-process router.

use crate::fixtures::*;
use crate::mock_backends::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use relay_core::TextDelta;
use relay_server::create_router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn test_health_endpoint() {
    let relay = TestRelayBuilder::new().build();
    let app = create_router(relay.state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_models_endpoint_lists_registry() {
    let relay = TestRelayBuilder::new().build();
    let app = create_router(relay.state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/models")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["object"], "list");
    let data = body["data"].as_array().expect("data");
    assert_eq!(data.len(), 6);
}

#[tokio::test]
async fn test_non_streaming_completion_returns_single_object() {
    let relay = TestRelayBuilder::new()
        .inference(MockInferenceBackend::streaming(vec![
            TextDelta::content("The answer is "),
            TextDelta::content("4."),
        ]))
        .build();
    let app = create_router(relay.state());

    let payload = json!({
        "model": "relay",
        "messages": [{"role": "user", "content": "What is 2+2?"}],
        "stream": false
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-request-id", "req_api_test")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["id"], "req_api_test");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "The answer is 4."
    );
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn test_streaming_completion_emits_chunks_and_sentinel() {
    let relay = TestRelayBuilder::new()
        .inference(MockInferenceBackend::streaming(vec![
            TextDelta::intermediate("thinking"),
            TextDelta::content("4"),
        ]))
        .build();
    let app = create_router(relay.state());

    let payload = json!({
        "model": "relay",
        "messages": [{"role": "user", "content": "What is 2+2?"}],
        "stream": true
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = body_text(response).await;
    assert!(body.contains("\"reasoning\":\"thinking\""));
    assert!(body.contains("\"content\":\"4\""));
    assert!(body.trim_end().ends_with("data: [DONE]"));
}

#[tokio::test]
async fn test_empty_messages_rejected() {
    let relay = TestRelayBuilder::new().build();
    let app = create_router(relay.state());

    let payload = json!({
        "model": "relay",
        "messages": [],
        "stream": false
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_request");
}

#[tokio::test]
async fn test_admin_pool_endpoint_reports_occupancy() {
    let relay = TestRelayBuilder::new().pool_target(2).build();
    relay.pool.prewarm().await;
    let app = create_router(relay.state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/pool")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let shelves = body.as_array().expect("array");
    assert_eq!(shelves.len(), 2);
    for shelf in shelves {
        assert_eq!(shelf["warm"], 2);
        assert_eq!(shelf["target"], 2);
    }
}

#[tokio::test]
async fn test_admin_stats_track_completions() {
    let relay = TestRelayBuilder::new()
        .inference(MockInferenceBackend::streaming(vec![TextDelta::content(
            "ok",
        )]))
        .build();
    let state = relay.state();

    let payload = json!({
        "model": "relay",
        "messages": [{"role": "user", "content": "hello"}],
        "stream": false
    });

    let response = create_router(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/admin/stats")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["completed"], 1);
    assert_eq!(body["active_requests"], 0);
}
