//! HTTP backend client tests against wiremock servers.

use futures_util::StreamExt;
use relay_backends::{HttpDecisionBackend, HttpInferenceBackend};
use relay_core::{
    BackendTarget, ChatMessage, DecisionBackend, InferenceBackend, InferenceCall, RelayError,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl_1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "relay-decider-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
    })
}

fn sse_body(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str("data: ");
        body.push_str(chunk);
        body.push_str("\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_decision_backend_returns_reply_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body(r#"{"path":"fast","model":"plain"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpDecisionBackend::new(
        format!("{}/v1", server.uri()),
        "relay-decider-1",
        "test-key",
        Duration::from_secs(1),
    )
    .expect("client");

    let reply = backend
        .complete_once(vec![ChatMessage::user("classify this")])
        .await
        .expect("reply");
    assert_eq!(reply, r#"{"path":"fast","model":"plain"}"#);
}

#[tokio::test]
async fn test_decision_backend_maps_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({"error": {"message": "overloaded"}})),
        )
        .mount(&server)
        .await;

    let backend = HttpDecisionBackend::new(
        format!("{}/v1", server.uri()),
        "relay-decider-1",
        "test-key",
        Duration::from_secs(1),
    )
    .expect("client");

    let err = backend
        .complete_once(vec![ChatMessage::user("classify this")])
        .await
        .expect_err("error");

    match err {
        RelayError::BackendUnavailable {
            message, retryable, ..
        } => {
            assert_eq!(message, "overloaded");
            assert!(retryable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_inference_backend_streams_deltas() {
    let server = MockServer::start().await;

    let chunk_content = json!({
        "id": "cmpl_2",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": "swift-chat-1",
        "choices": [{"index": 0, "delta": {"content": "4"}, "finish_reason": null}]
    })
    .to_string();
    let chunk_reasoning = json!({
        "id": "cmpl_2",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": "swift-chat-1",
        "choices": [{"index": 0, "delta": {"reasoning": "adding"}, "finish_reason": null}]
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    sse_body(&[&chunk_reasoning, &chunk_content]),
                    "text/event-stream",
                ),
        )
        .mount(&server)
        .await;

    let backend = HttpInferenceBackend::new(Duration::from_secs(5)).expect("client");
    let call = InferenceCall {
        target: BackendTarget::new("swift-chat-1", format!("{}/v1", server.uri()), "test-key"),
        messages: vec![ChatMessage::user("What is 2+2?")],
        max_tokens: 64,
    };

    let deltas: Vec<_> = backend
        .stream(call)
        .await
        .expect("stream")
        .collect()
        .await;

    let deltas: Vec<_> = deltas.into_iter().collect::<Result<Vec<_>, _>>().expect("ok deltas");
    assert_eq!(deltas.len(), 2);
    assert!(deltas[0].intermediate);
    assert_eq!(deltas[0].text, "adding");
    assert!(!deltas[1].intermediate);
    assert_eq!(deltas[1].text, "4");
}
