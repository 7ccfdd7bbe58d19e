//! Outbound response types: single-object completions and stream chunks.
//!
//! The shapes follow the common chat-completion wire contract. Relay-specific
//! additions ride on vendor-extension fields (`reasoning`, `artifact`,
//! `error`) so that stock clients ignore them while relay-aware clients can
//! render intermediate output and artifacts.

use crate::event::{ArtifactRef, ErrorDetail};
use crate::request::MessageRole;
use serde::{Deserialize, Serialize};

/// Non-streaming chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response id (mirrors the request id)
    pub id: String,
    /// Object type, always `"chat.completion"`
    pub object: String,
    /// Unix creation timestamp
    pub created: i64,
    /// Model label the response was produced under
    pub model: String,
    /// Completion choices (the relay always produces exactly one)
    pub choices: Vec<Choice>,
    /// Token usage, when the backend reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Assemble a single-choice response.
    #[must_use]
    pub fn single(
        id: impl Into<String>,
        model: impl Into<String>,
        created: i64,
        message: ResponseMessage,
        finish_reason: FinishReason,
    ) -> Self {
        Self {
            id: id.into(),
            object: "chat.completion".to_string(),
            created,
            model: model.into(),
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some(finish_reason),
            }],
            usage: None,
        }
    }
}

/// One completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Choice index
    pub index: u32,
    /// The completed message
    pub message: ResponseMessage,
    /// Why generation stopped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Assistant message inside a completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Always [`MessageRole::Assistant`]
    pub role: MessageRole,
    /// Answer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Artifacts produced during agent-path execution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactRef>,
}

impl ResponseMessage {
    /// Assistant message with plain text content.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            artifacts: Vec::new(),
        }
    }
}

/// Reason a choice finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural completion
    Stop,
    /// Token limit reached
    Length,
    /// Terminated by an error appended to the stream
    Error,
}

/// Token usage accounting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Streaming chat completion chunk.
///
/// Each chunk carries at most one payload: a content delta, a reasoning
/// delta, an artifact descriptor, or a terminal error descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Response id (mirrors the request id)
    pub id: String,
    /// Object type, always `"chat.completion.chunk"`
    pub object: String,
    /// Unix creation timestamp
    pub created: i64,
    /// Model label
    pub model: String,
    /// Chunk choices
    pub choices: Vec<ChunkChoice>,
}

impl ChatChunk {
    fn base(id: &str, model: &str, created: i64, delta: ChunkDelta) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk".to_string(),
            created,
            model: model.to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason: None,
            }],
        }
    }

    /// Chunk carrying a content delta.
    #[must_use]
    pub fn content(id: &str, model: &str, created: i64, text: impl Into<String>) -> Self {
        Self::base(
            id,
            model,
            created,
            ChunkDelta {
                content: Some(text.into()),
                ..ChunkDelta::default()
            },
        )
    }

    /// Chunk carrying a reasoning delta.
    #[must_use]
    pub fn reasoning(id: &str, model: &str, created: i64, text: impl Into<String>) -> Self {
        Self::base(
            id,
            model,
            created,
            ChunkDelta {
                reasoning: Some(text.into()),
                ..ChunkDelta::default()
            },
        )
    }

    /// Chunk carrying an artifact descriptor.
    #[must_use]
    pub fn artifact(id: &str, model: &str, created: i64, artifact: ArtifactRef) -> Self {
        Self::base(
            id,
            model,
            created,
            ChunkDelta {
                artifact: Some(artifact),
                ..ChunkDelta::default()
            },
        )
    }

    /// Chunk carrying a terminal error descriptor.
    #[must_use]
    pub fn error(id: &str, model: &str, created: i64, error: ErrorDetail) -> Self {
        let mut chunk = Self::base(
            id,
            model,
            created,
            ChunkDelta {
                error: Some(error),
                ..ChunkDelta::default()
            },
        );
        chunk.choices[0].finish_reason = Some(FinishReason::Error);
        chunk
    }
}

/// One choice inside a stream chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Choice index
    pub index: u32,
    /// The incremental payload
    pub delta: ChunkDelta,
    /// Set on the final chunk of a choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Incremental payload of a stream chunk. At most one field is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Role marker, sent on the first chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,
    /// Content delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning/intermediate delta (vendor extension)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Artifact descriptor (vendor extension)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRef>,
    /// Terminal error descriptor (vendor extension)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Model listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    /// Object type, always `"list"`
    pub object: String,
    /// Listed models
    pub data: Vec<ModelObject>,
}

impl ModelsResponse {
    /// Wrap a model list.
    #[must_use]
    pub fn new(data: Vec<ModelObject>) -> Self {
        Self {
            object: "list".to_string(),
            data,
        }
    }
}

/// One listed model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelObject {
    /// Model id
    pub id: String,
    /// Object type, always `"model"`
    pub object: String,
    /// Owner label
    pub owned_by: String,
}

impl ModelObject {
    /// Build a model object.
    #[must_use]
    pub fn new(id: impl Into<String>, owned_by: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object: "model".to_string(),
            owned_by: owned_by.into(),
        }
    }
}
