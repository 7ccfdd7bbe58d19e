//! HTTP client for the sandbox platform.
//!
//! Control calls are plain JSON; task execution streams native events over
//! SSE. Dropping the event stream aborts the underlying call.

use crate::platform::{
    ProvisionedSandbox, SandboxEvent, SandboxFlavor, SandboxId, SandboxPlatform, TaskSpec,
};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use relay_core::RelayError;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace, warn};

#[derive(Debug, serde::Serialize)]
struct CreateRequest {
    flavor: SandboxFlavor,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
    base_url: String,
}

/// HTTP client for the sandbox platform control API.
pub struct HttpSandboxPlatform {
    client: Client,
    endpoint: String,
    api_key: SecretString,
}

impl HttpSandboxPlatform {
    /// Create the platform client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        control_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let client = Client::builder()
            .connect_timeout(control_timeout)
            .build()
            .map_err(|e| RelayError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    async fn control_call(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<reqwest::Response, RelayError> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| RelayError::sandbox_unavailable(format!("{action} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::sandbox_unavailable(format!(
                "{action} returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl SandboxPlatform for HttpSandboxPlatform {
    async fn create(&self, flavor: SandboxFlavor) -> Result<ProvisionedSandbox, RelayError> {
        debug!(flavor = %flavor, "Creating sandbox");

        let response = self
            .control_call(
                self.client
                    .post(self.url("sandboxes"))
                    .json(&CreateRequest { flavor }),
                "create",
            )
            .await?;

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|e| RelayError::sandbox_unavailable(format!("malformed create reply: {e}")))?;

        Ok(ProvisionedSandbox {
            id: SandboxId::new(created.id),
            base_url: created.base_url,
        })
    }

    async fn submit(
        &self,
        sandbox: &ProvisionedSandbox,
        task: TaskSpec,
    ) -> Result<BoxStream<'static, Result<SandboxEvent, RelayError>>, RelayError> {
        let url = self.url(&format!("sandboxes/{}/tasks", sandbox.id));
        let sandbox_id = sandbox.id.clone();

        debug!(sandbox = %sandbox_id, "Submitting task");

        let request_builder = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&task);

        let event_source = EventSource::new(request_builder).map_err(|e| {
            RelayError::sandbox_unavailable(format!("failed to open task stream: {e}"))
        })?;

        let stream = try_stream! {
            let mut es = event_source;

            while let Some(event) = es.next().await {
                match event {
                    Ok(Event::Open) => {
                        trace!(sandbox = %sandbox_id, "Task stream opened");
                    }
                    Ok(Event::Message(msg)) => {
                        match serde_json::from_str::<SandboxEvent>(msg.data.trim()) {
                            Ok(event) => {
                                let terminal = event.is_terminal();
                                yield event;
                                if terminal {
                                    break;
                                }
                            }
                            Err(e) => {
                                // Unknown tags parse as Unknown; this is a
                                // framing failure, worth surfacing in logs.
                                warn!(sandbox = %sandbox_id, error = %e, "Unparseable sandbox event");
                            }
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => {
                        break;
                    }
                    Err(e) => {
                        Err(RelayError::streaming(format!("task stream failed: {e}")))?;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn reset(&self, id: &SandboxId) -> Result<(), RelayError> {
        debug!(sandbox = %id, "Resetting sandbox");
        self.control_call(
            self.client.post(self.url(&format!("sandboxes/{id}/reset"))),
            "reset",
        )
        .await?;
        Ok(())
    }

    async fn terminate(&self, id: &SandboxId) -> Result<(), RelayError> {
        debug!(sandbox = %id, "Terminating sandbox");
        self.control_call(
            self.client.delete(self.url(&format!("sandboxes/{id}"))),
            "terminate",
        )
        .await?;
        Ok(())
    }
}
