//! HTTP request handlers for the relay API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::StreamExt;
use relay_core::{
    ChatChunk, ChatRequest, ChatResponse, FinishReason, ModelsResponse, ResponseMessage,
    StreamEvent,
};
use relay_engine::DispatchedStream;
use relay_telemetry::{RequestOutcome, RequestTracker, TrackerStats};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{error::ApiError, extractors::RequestId, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Version
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    // Ready once the pool exists; an empty pool still serves cold creates.
    let _ = state.pool.occupancy().await;
    (StatusCode::OK, "ready")
}

/// Liveness check endpoint
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}

/// List models endpoint (chat-completion compatible)
#[instrument(skip(state))]
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse::new(
        state.dispatcher.registry().list_models(),
    ))
}

/// Chat completion endpoint, streaming and non-streaming.
#[instrument(skip(state, body), fields(request_id = %request_id.0))]
pub async fn chat_completion(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(mut body): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    body.id = request_id.0;
    let streaming = body.stream;
    let request_id = body.id.clone();

    debug!(streaming = streaming, "Processing chat completion request");

    let dispatched = state.dispatcher.handle(body).await.map_err(ApiError::from)?;

    let path_label = dispatched.decision.path.to_string();
    let model_label = dispatched.decision.model.to_string();
    state.tracker.start(request_id.as_str(), &path_label);

    if streaming {
        Ok(stream_response(
            Arc::clone(&state.tracker),
            request_id.as_str().to_string(),
            model_label,
            dispatched,
        ))
    } else {
        collect_response(
            Arc::clone(&state.tracker),
            request_id.as_str().to_string(),
            model_label,
            dispatched,
        )
        .await
    }
}

/// Records the request outcome even when the caller walks away mid-stream.
struct FinishGuard {
    tracker: Arc<RequestTracker>,
    request_id: String,
    outcome: Option<RequestOutcome>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.tracker.finish(
            &self.request_id,
            self.outcome.unwrap_or(RequestOutcome::Cancelled),
        );
    }
}

/// One frame of the streaming response.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// JSON data chunk
    Data(String),
    /// SSE comment, used for keepalives
    Comment(&'static str),
    /// The terminating sentinel
    Sentinel,
}

/// Map one stream event to its wire frame. KeepAlive becomes a comment so
/// it can never be mistaken for a content chunk; Done becomes the sentinel.
fn frame_for_event(event: &StreamEvent, request_id: &str, model: &str, created: i64) -> Frame {
    let chunk = match event {
        StreamEvent::Content { text } => ChatChunk::content(request_id, model, created, text),
        StreamEvent::Reasoning { text } => ChatChunk::reasoning(request_id, model, created, text),
        StreamEvent::Artifact(artifact) => {
            ChatChunk::artifact(request_id, model, created, artifact.clone())
        }
        StreamEvent::Error(detail) => ChatChunk::error(request_id, model, created, detail.clone()),
        StreamEvent::KeepAlive => return Frame::Comment("keep-alive"),
        StreamEvent::Done => return Frame::Sentinel,
    };

    Frame::Data(serde_json::to_string(&chunk).unwrap_or_default())
}

fn stream_response(
    tracker: Arc<RequestTracker>,
    request_id: String,
    model: String,
    dispatched: DispatchedStream,
) -> Response {
    let created = chrono::Utc::now().timestamp();

    let sse_stream = async_stream::stream! {
        let mut guard = FinishGuard {
            tracker,
            request_id: request_id.clone(),
            outcome: None,
        };
        let mut saw_error = false;
        let mut events = dispatched.events;

        while let Some(event) = events.next().await {
            if matches!(event, StreamEvent::Error(_)) {
                saw_error = true;
            }

            match frame_for_event(&event, &request_id, &model, created) {
                Frame::Data(data) => {
                    yield Ok::<_, Infallible>(Event::default().data(data));
                }
                Frame::Comment(comment) => {
                    yield Ok(Event::default().comment(comment));
                }
                Frame::Sentinel => {
                    guard.outcome = Some(if saw_error {
                        RequestOutcome::Failed
                    } else {
                        RequestOutcome::Success
                    });
                    yield Ok(Event::default().data("[DONE]"));
                    break;
                }
            }
        }
    };

    Sse::new(sse_stream).into_response()
}

async fn collect_response(
    tracker: Arc<RequestTracker>,
    request_id: String,
    model: String,
    dispatched: DispatchedStream,
) -> Result<Response, ApiError> {
    let created = chrono::Utc::now().timestamp();

    let mut guard = FinishGuard {
        tracker,
        request_id: request_id.clone(),
        outcome: None,
    };

    let mut content = String::new();
    let mut artifacts = Vec::new();
    let mut error = None;
    let mut events = dispatched.events;

    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Content { text } => content.push_str(&text),
            StreamEvent::Artifact(artifact) => artifacts.push(artifact),
            StreamEvent::Error(detail) => error = Some(detail),
            StreamEvent::Done => break,
            StreamEvent::Reasoning { .. } | StreamEvent::KeepAlive => {}
        }
    }

    guard.outcome = Some(if error.is_some() {
        RequestOutcome::Failed
    } else {
        RequestOutcome::Success
    });
    drop(guard);

    if let Some(detail) = &error {
        if content.is_empty() && artifacts.is_empty() {
            return Err(ApiError::new(
                StatusCode::BAD_GATEWAY,
                detail.code.clone(),
                detail.message.clone(),
            ));
        }
        // Partial output is kept; the error is appended as an explanatory
        // segment rather than retracting what was produced.
        content.push_str("\n\n[");
        content.push_str(&detail.message);
        content.push(']');
    }

    let mut message = ResponseMessage::assistant(content);
    message.artifacts = artifacts;

    let finish_reason = if error.is_some() {
        FinishReason::Error
    } else {
        FinishReason::Stop
    };

    Ok(Json(ChatResponse::single(
        request_id,
        model,
        created,
        message,
        finish_reason,
    ))
    .into_response())
}

// =============================================================================
// Admin endpoints
// =============================================================================

/// Warm pool occupancy endpoint
pub async fn pool_occupancy(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pool.occupancy().await)
}

/// Request statistics endpoint
pub async fn relay_stats(State(state): State<AppState>) -> Json<TrackerStats> {
    Json(state.tracker.stats())
}
