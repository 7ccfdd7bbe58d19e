//! Outbound wire types shared by the backend clients.

use relay_core::{ChatMessage, MessageContent, MessageRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest {
    pub model: String,
    pub messages: Vec<OutboundMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OutboundMessage {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl From<&ChatMessage> for OutboundMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: InboundMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InboundMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChoice {
    pub delta: StreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    /// Intermediate output marker used by reasoning-capable backends
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BackendErrorBody {
    pub error: BackendErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BackendErrorDetail {
    pub message: String,
}

/// Map a non-success response body to a backend error, preferring the
/// structured message when the body carries one.
pub(crate) fn map_error_body(backend: &str, status: u16, body: &str) -> relay_core::RelayError {
    let message = serde_json::from_str::<BackendErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    relay_core::RelayError::backend(backend, message, Some(status), status >= 500 || status == 429)
}
