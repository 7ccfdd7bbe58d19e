//! One-shot decision backend client.
//!
//! The decision backend speaks the same wire contract as the inference
//! backends but is always called non-streaming, with a fixed small model,
//! for exactly one structured reply. The latency budget lives with the
//! classifier; this client only bounds the transport.

use crate::wire::{map_error_body, CompletionRequest, CompletionResponse, OutboundMessage};
use async_trait::async_trait;
use relay_core::{ChatMessage, DecisionBackend, RelayError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

/// Token budget for a classification reply; a legal pair fits comfortably.
const DECISION_MAX_TOKENS: u32 = 64;

/// HTTP client for the dedicated decision backend.
pub struct HttpDecisionBackend {
    client: Client,
    endpoint: String,
    model_id: String,
    api_key: SecretString,
}

impl HttpDecisionBackend {
    /// Create the decision backend client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        endpoint: impl Into<String>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
        call_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| RelayError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model_id: model_id.into(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl DecisionBackend for HttpDecisionBackend {
    async fn complete_once(&self, messages: Vec<ChatMessage>) -> Result<String, RelayError> {
        let body = CompletionRequest {
            model: self.model_id.clone(),
            messages: messages.iter().map(OutboundMessage::from).collect(),
            max_tokens: Some(DECISION_MAX_TOKENS),
            stream: false,
        };

        debug!(model = %self.model_id, "Issuing classification call");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RelayError::backend(&self.model_id, format!("request failed: {e}"), None, true)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_body(&self.model_id, status, &body));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            RelayError::backend(
                &self.model_id,
                format!("failed to parse response: {e}"),
                None,
                false,
            )
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RelayError::ClassificationMalformed {
                detail: "reply carried no content".to_string(),
            })
    }
}
