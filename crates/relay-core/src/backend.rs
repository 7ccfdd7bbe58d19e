//! Backend traits and connection targets.
//!
//! The relay talks to two kinds of model backends: streaming inference
//! backends serving completions, and a dedicated decision backend answering
//! one-shot classification calls. Both are abstracted behind traits so that
//! tests can substitute in-process fakes.

use crate::error::RelayError;
use crate::request::ChatMessage;
use async_trait::async_trait;
use futures::stream::BoxStream;
use secrecy::SecretString;
use std::time::Duration;

/// Connection parameters for one backend model, resolved by the registry.
#[derive(Debug, Clone)]
pub struct BackendTarget {
    /// Wire model id the backend expects (e.g. `"swift-chat-1"`)
    pub model_id: String,
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// API key presented to the backend
    pub api_key: SecretString,
    /// Default max_tokens when the request does not set one
    pub max_tokens: u32,
    /// Per-call timeout for connect/first byte
    pub call_timeout: Duration,
}

impl BackendTarget {
    /// Create a target with default limits.
    #[must_use]
    pub fn new(
        model_id: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            endpoint: endpoint.into(),
            api_key: SecretString::new(api_key.into()),
            max_tokens: 4096,
            call_timeout: Duration::from_secs(10),
        }
    }

    /// Override the default max_tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// One streaming inference call.
#[derive(Debug, Clone)]
pub struct InferenceCall {
    /// Resolved backend target
    pub target: BackendTarget,
    /// Conversation to complete
    pub messages: Vec<ChatMessage>,
    /// Token budget for the completion
    pub max_tokens: u32,
}

/// One incremental text delta from a streaming backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Delta text
    pub text: String,
    /// Whether the backend marked this delta as intermediate output
    /// (reasoning) rather than answer text
    pub intermediate: bool,
}

impl TextDelta {
    /// Answer-text delta.
    #[must_use]
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intermediate: false,
        }
    }

    /// Intermediate (reasoning) delta.
    #[must_use]
    pub fn intermediate(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intermediate: true,
        }
    }
}

/// A streaming inference backend.
///
/// Implementations must support cancellation: dropping the returned stream
/// aborts the underlying call.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Open one streaming completion call.
    ///
    /// # Errors
    /// Returns [`RelayError::BackendUnavailable`] when the call cannot be
    /// opened; mid-stream failures surface as `Err` items on the stream.
    async fn stream(
        &self,
        call: InferenceCall,
    ) -> Result<BoxStream<'static, Result<TextDelta, RelayError>>, RelayError>;
}

/// The dedicated decision backend, used non-streaming with a fixed small
/// model for one-shot classification.
#[async_trait]
pub trait DecisionBackend: Send + Sync {
    /// Issue one bounded completion call and return the raw reply text.
    ///
    /// # Errors
    /// Returns an error when the backend cannot be reached or replies with a
    /// non-success status. The caller owns the latency budget.
    async fn complete_once(&self, messages: Vec<ChatMessage>) -> Result<String, RelayError>;
}
