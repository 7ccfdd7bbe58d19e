//! Stream events produced by executors.
//!
//! Events for one request are totally ordered; the multiplexer forwards them
//! without reordering or duplication.

use serde::{Deserialize, Serialize};

/// One event on a request's output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Intermediate output: tool use, status lines, retry notices.
    Reasoning {
        /// Delta text
        text: String,
    },
    /// User-facing answer text.
    Content {
        /// Delta text
        text: String,
    },
    /// A file produced by agent-path execution.
    Artifact(ArtifactRef),
    /// Synthetic idle signal. Never carries content; a distinct variant so
    /// it can never be confused with real output.
    KeepAlive,
    /// Terminal error descriptor, always followed by [`StreamEvent::Done`].
    Error(ErrorDetail),
    /// End of stream.
    Done,
}

impl StreamEvent {
    /// Convenience constructor for reasoning deltas.
    #[must_use]
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning { text: text.into() }
    }

    /// Convenience constructor for content deltas.
    #[must_use]
    pub fn content(text: impl Into<String>) -> Self {
        Self::Content { text: text.into() }
    }

    /// Whether this event terminates the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Reference to a file written inside a sandbox.
///
/// Valid only while the owning sandbox lives; callers that need durability
/// must materialize the file elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Fetchable URL under the sandbox's public base URL
    pub url: String,
    /// MIME type, if the sandbox reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Wire-facing error descriptor carried by [`StreamEvent::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable explanation appended to the stream
    pub message: String,
}

impl ErrorDetail {
    /// Build a descriptor from code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
