//! Inbound request types for the relay.
//!
//! This module defines the chat-completion-compatible wire contract accepted
//! by the relay, including the vendor-extension routing hint. A request is
//! immutable once accepted; everything derived from it (modality flags, the
//! routing decision) is computed against this frozen value.

use crate::decision::Decision;
use crate::types::RequestId;
use serde::{Deserialize, Serialize};

/// Chat-completion request accepted on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Unique request identifier
    #[serde(default = "RequestId::generate")]
    pub id: RequestId,

    /// Advisory model label sent by the caller. The relay routes by its own
    /// [`Decision`]; this field is echoed back in responses.
    #[serde(default)]
    pub model: String,

    /// Ordered conversation history
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate on the fast path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Enable streaming response
    #[serde(default)]
    pub stream: bool,

    /// Vendor-extension routing hint. When well-formed it is honored
    /// verbatim and no classification call is made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_hint: Option<RouteHint>,
}

impl ChatRequest {
    /// Whether any message carries image content.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.messages.iter().any(ChatMessage::has_image)
    }

    /// The latest user message's plain text, if any. Used as the task
    /// statement for agent-path execution.
    #[must_use]
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .and_then(|m| m.content.as_text())
    }

    /// Parse the routing hint into a [`Decision`], if present and
    /// well-formed. Malformed hints are ignored, never an error.
    #[must_use]
    pub fn hinted_decision(&self) -> Option<Decision> {
        self.route_hint.as_ref().and_then(RouteHint::to_decision)
    }

    /// Validate the request.
    ///
    /// # Errors
    /// Returns error if the message list is empty or contains an empty
    /// content entry.
    pub fn validate(&self) -> Result<(), crate::error::RelayError> {
        if self.messages.is_empty() {
            return Err(crate::error::RelayError::validation(
                "messages cannot be empty",
                Some("messages".to_string()),
            ));
        }

        if self.messages.iter().any(|m| m.content.is_empty()) {
            return Err(crate::error::RelayError::validation(
                "message content cannot be empty",
                Some("messages".to_string()),
            ));
        }

        Ok(())
    }
}

/// Vendor-extension routing hint carried on the request.
///
/// The hint travels inside the request value end-to-end; it is never stashed
/// in ambient or task-local state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteHint {
    /// Requested path: `"fast"` or `"agent"`
    pub path: String,
    /// Requested model class, e.g. `"plain"` or `"general-agent-model"`
    pub model: String,
}

impl RouteHint {
    /// Resolve the hint against the closed decision enumeration.
    ///
    /// Returns `None` for anything outside the legal pairs; a free
    /// combination is never honored.
    #[must_use]
    pub fn to_decision(&self) -> Option<Decision> {
        Decision::from_labels(&self.path, &self.model)
    }
}

/// Chat message with role and content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author
    pub role: MessageRole,

    /// Content of the message
    pub content: MessageContent,

    /// Optional name of the author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
            name: None,
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
            name: None,
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
            name: None,
        }
    }

    /// Whether this message carries an image part.
    #[must_use]
    pub fn has_image(&self) -> bool {
        match &self.content {
            MessageContent::Text(_) => false,
            MessageContent::Parts(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::ImageUrl { .. })),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message content (text or multimodal parts)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Multimodal content parts
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Get as text if this is plain text content
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Parts(_) => None,
        }
    }

    /// Flatten to text, joining text parts and skipping images.
    #[must_use]
    pub fn to_text_lossy(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Check if content is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Content part for multimodal messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content part
    Text {
        /// The text content
        text: String,
    },
    /// Image content part
    ImageUrl {
        /// Image URL details
        image_url: ImageUrl,
    },
}

/// Image URL for multimodal requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL of the image (remote or data URI)
    pub url: String,
}
