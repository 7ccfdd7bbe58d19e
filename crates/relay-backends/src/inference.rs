//! Streaming inference backend client.
//!
//! Opens one SSE chat-completion call per request. Dropping the returned
//! stream drops the underlying event source, which aborts the HTTP call —
//! that is the cancellation path the trait contract requires.

use crate::wire::{CompletionRequest, OutboundMessage, StreamChunk};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use relay_core::{InferenceBackend, InferenceCall, RelayError, TextDelta};
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// HTTP client for streaming inference backends.
pub struct HttpInferenceBackend {
    client: Client,
}

impl HttpInferenceBackend {
    /// Create the backend client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(connect_timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(100)
            .build()
            .map_err(|e| RelayError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn completions_url(endpoint: &str) -> String {
        format!("{}/chat/completions", endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn stream(
        &self,
        call: InferenceCall,
    ) -> Result<BoxStream<'static, Result<TextDelta, RelayError>>, RelayError> {
        let url = Self::completions_url(&call.target.endpoint);
        let model_id = call.target.model_id.clone();

        let body = CompletionRequest {
            model: model_id.clone(),
            messages: call.messages.iter().map(OutboundMessage::from).collect(),
            max_tokens: Some(call.max_tokens),
            stream: true,
        };

        debug!(model = %model_id, url = %url, "Opening streaming backend call");

        // No overall .timeout() here: an SSE call legitimately stays open
        // for minutes. The connect timeout bounds dial time; the stream
        // multiplexer owns the total-duration ceiling.
        let request_builder = self
            .client
            .post(&url)
            .bearer_auth(call.target.api_key.expose_secret())
            .json(&body);

        let event_source = EventSource::new(request_builder).map_err(|e| {
            RelayError::backend(&model_id, format!("failed to open event source: {e}"), None, true)
        })?;

        let stream = try_stream! {
            let mut es = event_source;

            while let Some(event) = es.next().await {
                match event {
                    Ok(Event::Open) => {
                        trace!(model = %model_id, "Backend stream opened");
                    }
                    Ok(Event::Message(msg)) => {
                        let data = msg.data.trim();

                        if data == "[DONE]" {
                            break;
                        }

                        match serde_json::from_str::<StreamChunk>(data) {
                            Ok(chunk) => {
                                for choice in chunk.choices {
                                    if let Some(text) = choice.delta.reasoning {
                                        yield TextDelta::intermediate(text);
                                    }
                                    if let Some(text) = choice.delta.content {
                                        yield TextDelta::content(text);
                                    }
                                    if choice.finish_reason.is_some() {
                                        trace!(model = %model_id, "Backend reported finish");
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(model = %model_id, error = %e, data = %data, "Failed to parse backend chunk");
                            }
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => {
                        break;
                    }
                    Err(e) => {
                        let status = match &e {
                            reqwest_eventsource::Error::InvalidStatusCode(code, _) => {
                                Some(code.as_u16())
                            }
                            _ => None,
                        };
                        let retryable = status.map_or(true, |s| s >= 500 || s == 429);
                        Err(RelayError::backend(
                            &model_id,
                            format!("stream failed: {e}"),
                            status,
                            retryable,
                        ))?;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
