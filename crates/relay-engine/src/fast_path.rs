//! The fast-path executor.
//!
//! One streaming inference call, republished as stream events. There is no
//! internal retry: a partial token stream cannot be resumed mid-token, so a
//! mid-flight failure surfaces as a terminal error and any restart decision
//! belongs to layers above.

use crate::executor::ExecutorStream;
use async_stream::stream;
use futures_util::StreamExt;
use relay_core::{
    BackendTarget, ChatRequest, InferenceBackend, InferenceCall, StreamEvent,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Executor for fast-path requests.
pub struct FastPathExecutor {
    backend: Arc<dyn InferenceBackend>,
}

impl FastPathExecutor {
    /// Create the executor over an inference backend.
    #[must_use]
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Run one streaming call against the resolved target.
    #[must_use]
    pub fn run(&self, request: &ChatRequest, target: BackendTarget) -> ExecutorStream {
        let backend = Arc::clone(&self.backend);
        let request_id = request.id.clone();
        let call = InferenceCall {
            max_tokens: request.max_tokens.unwrap_or(target.max_tokens),
            messages: request.messages.clone(),
            target,
        };

        let events = stream! {
            let mut deltas = match backend.stream(call).await {
                Ok(deltas) => deltas,
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "Fast-path call failed to open");
                    yield StreamEvent::Error(e.to_detail());
                    yield StreamEvent::Done;
                    return;
                }
            };

            while let Some(delta) = deltas.next().await {
                match delta {
                    Ok(delta) if delta.intermediate => {
                        yield StreamEvent::reasoning(delta.text);
                    }
                    Ok(delta) => {
                        yield StreamEvent::content(delta.text);
                    }
                    Err(e) => {
                        warn!(request_id = %request_id, error = %e, "Fast-path stream failed");
                        yield StreamEvent::Error(e.to_detail());
                        yield StreamEvent::Done;
                        return;
                    }
                }
            }

            debug!(request_id = %request_id, "Fast-path stream complete");
            yield StreamEvent::Done;
        };

        ExecutorStream::unleased(Box::pin(events))
    }
}
