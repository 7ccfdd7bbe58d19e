//! The agent-path executor.
//!
//! Runs one task inside an isolated sandbox, translating the platform's
//! native event stream into relay stream events as they are produced —
//! output is never buffered until the end. The execution moves through
//! CREATING, RUNNING, and one of COMPLETE, FAILED, or TIMED_OUT; the
//! sandbox lease guarantees the handle is released exactly once on
//! whichever exit is taken.

use crate::backoff::BackoffCurve;
use crate::executor::ExecutorStream;
use crate::lease::SandboxLease;
use async_stream::stream;
use futures_util::StreamExt;
use relay_config::AgentConfig;
use relay_core::{BackendTarget, ChatRequest, ModelClass, RelayError, StreamEvent};
use relay_sandbox::{
    translate_event, SandboxEvent, SandboxFlavor, SandboxPlatform, TaskSpec, WarmPool,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Executor for agent-path requests.
pub struct AgentPathExecutor {
    platform: Arc<dyn SandboxPlatform>,
    pool: Arc<WarmPool>,
    config: AgentConfig,
    backoff: BackoffCurve,
}

impl AgentPathExecutor {
    /// Create the executor over the sandbox platform and warm pool.
    #[must_use]
    pub fn new(
        platform: Arc<dyn SandboxPlatform>,
        pool: Arc<WarmPool>,
        config: AgentConfig,
    ) -> Self {
        let backoff = BackoffCurve::from_config(&config);
        Self {
            platform,
            pool,
            config,
            backoff,
        }
    }

    /// Sandbox flavor for a task profile. Simple tasks run headless;
    /// everything else gets the browser/media-capable environment.
    #[must_use]
    pub fn flavor_for(model: ModelClass) -> SandboxFlavor {
        match model {
            ModelClass::SimpleTask => SandboxFlavor::Headless,
            _ => SandboxFlavor::AgentReady,
        }
    }

    /// Execute one agent task.
    ///
    /// Acquisition happens up front (the CREATING state); failure to acquire
    /// produces a terminal "sandbox unavailable" stream without a lease.
    pub async fn run(
        &self,
        request: &ChatRequest,
        model: ModelClass,
        target: BackendTarget,
    ) -> ExecutorStream {
        let flavor = Self::flavor_for(model);

        let handle = match self.pool.acquire(flavor).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "Sandbox acquisition failed");
                let detail = e.to_detail();
                let events = stream! {
                    yield StreamEvent::Error(detail);
                    yield StreamEvent::Done;
                };
                return ExecutorStream::unleased(Box::pin(events));
            }
        };

        debug!(
            request_id = %request.id,
            sandbox = %handle.id(),
            flavor = %flavor,
            "Sandbox acquired"
        );

        let sandbox = handle.sandbox().clone();
        let base_url = handle.base_url().to_string();
        let lease = SandboxLease::new(Arc::clone(&self.pool), handle);

        let task = Self::build_task(request, &target);
        let platform = Arc::clone(&self.platform);
        let request_id = request.id.clone();
        let read_timeout = self.config.read_timeout;
        let max_retries = self.config.max_retries;
        let backoff = self.backoff.clone();
        let stream_lease = lease.clone();

        let events = stream! {
            let lease = stream_lease;
            yield StreamEvent::reasoning("Starting the task in an isolated environment...");

            let mut timeouts: u32 = 0;
            'attempts: loop {
                let mut native = match platform.submit(&sandbox, task.clone()).await {
                    Ok(native) => native,
                    Err(e) => {
                        warn!(request_id = %request_id, error = %e, "Task submission failed");
                        lease.release(false).await;
                        yield StreamEvent::Error(e.to_detail());
                        yield StreamEvent::Done;
                        return;
                    }
                };

                loop {
                    match tokio::time::timeout(read_timeout, native.next()).await {
                        Ok(Some(Ok(event))) => match event {
                            SandboxEvent::Completed => {
                                info!(request_id = %request_id, "Agent task complete");
                                lease.release(true).await;
                                yield StreamEvent::Done;
                                return;
                            }
                            SandboxEvent::Failed { .. } => {
                                warn!(request_id = %request_id, "Agent task failed in sandbox");
                                lease.release(false).await;
                                yield translate_event(event, &base_url);
                                yield StreamEvent::Done;
                                return;
                            }
                            other => {
                                yield translate_event(other, &base_url);
                            }
                        },
                        Ok(Some(Err(e))) => {
                            warn!(request_id = %request_id, error = %e, "Sandbox stream error");
                            timeouts += 1;
                            if timeouts <= max_retries {
                                yield StreamEvent::reasoning(format!(
                                    "Connection to the agent environment was lost; \
                                     retrying (attempt {timeouts} of {max_retries})..."
                                ));
                                tokio::time::sleep(backoff.delay_for_attempt(timeouts - 1)).await;
                                continue 'attempts;
                            }
                            lease.release(false).await;
                            yield StreamEvent::Error(
                                RelayError::SandboxReadTimeout {
                                    elapsed: read_timeout,
                                }
                                .to_detail(),
                            );
                            yield StreamEvent::Done;
                            return;
                        }
                        Ok(None) => {
                            // Platform closed the stream without a terminal
                            // event; the task is over and the sandbox ended
                            // in a clean state.
                            debug!(request_id = %request_id, "Sandbox stream closed cleanly");
                            lease.release(true).await;
                            yield StreamEvent::Done;
                            return;
                        }
                        Err(_) => {
                            warn!(
                                request_id = %request_id,
                                timeout = ?read_timeout,
                                "Sandbox read timed out"
                            );
                            timeouts += 1;
                            if timeouts <= max_retries {
                                yield StreamEvent::reasoning(format!(
                                    "The agent environment went quiet; \
                                     retrying (attempt {timeouts} of {max_retries})..."
                                ));
                                tokio::time::sleep(backoff.delay_for_attempt(timeouts - 1)).await;
                                continue 'attempts;
                            }
                            lease.release(false).await;
                            yield StreamEvent::Error(
                                RelayError::SandboxReadTimeout {
                                    elapsed: read_timeout,
                                }
                                .to_detail(),
                            );
                            yield StreamEvent::Done;
                            return;
                        }
                    }
                }
            }
        };

        ExecutorStream::leased(Box::pin(events), lease)
    }

    /// Build the task specification from the request.
    fn build_task(request: &ChatRequest, target: &BackendTarget) -> TaskSpec {
        let instructions = request
            .last_user_text()
            .map(ToString::to_string)
            .or_else(|| {
                request
                    .messages
                    .last()
                    .map(|m| m.content.to_text_lossy())
            })
            .unwrap_or_default();

        let transcript: Vec<String> = request
            .messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content.to_text_lossy()))
            .collect();

        TaskSpec::new(instructions)
            .with_transcript(transcript.join("\n"))
            .with_agent_model(&target.model_id)
    }
}
