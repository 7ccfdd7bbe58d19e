//! The dispatcher: the only boundary-facing component of the engine.
//!
//! Sequences classify → resolve → execute → multiplex for each request. The
//! decision is made exactly once, before execution, and is never mutated or
//! re-classified afterwards — executors receive it by value and the
//! dispatcher retries nothing itself.

use crate::agent_path::AgentPathExecutor;
use crate::fast_path::FastPathExecutor;
use crate::multiplexer::StreamMultiplexer;
use futures::stream::BoxStream;
use relay_core::{ChatRequest, Decision, RelayError, RoutePath, StreamEvent};
use relay_routing::{DecisionClassifier, ModelRegistry};
use tracing::{debug, instrument};

/// One dispatched request: the decision that was made and the wrapped
/// event stream to forward to the caller.
pub struct DispatchedStream {
    /// The authoritative routing decision
    pub decision: Decision,
    /// Ordered events, ending with [`StreamEvent::Done`]
    pub events: BoxStream<'static, StreamEvent>,
}

/// Boundary-facing request dispatcher.
pub struct Dispatcher {
    classifier: DecisionClassifier,
    registry: ModelRegistry,
    fast: FastPathExecutor,
    agent: AgentPathExecutor,
    multiplexer: StreamMultiplexer,
}

impl Dispatcher {
    /// Assemble the dispatcher from its components.
    #[must_use]
    pub fn new(
        classifier: DecisionClassifier,
        registry: ModelRegistry,
        fast: FastPathExecutor,
        agent: AgentPathExecutor,
        multiplexer: StreamMultiplexer,
    ) -> Self {
        Self {
            classifier,
            registry,
            fast,
            agent,
            multiplexer,
        }
    }

    /// Handle one request end to end, returning its wrapped event stream.
    ///
    /// # Errors
    /// Returns error for invalid requests or registry misconfiguration;
    /// execution failures surface on the stream, not here.
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    pub async fn handle(&self, request: ChatRequest) -> Result<DispatchedStream, RelayError> {
        request.validate()?;

        let decision = self.classifier.classify(&request).await;
        let target = self.registry.resolve(decision.model)?;

        debug!(
            decision = %decision,
            backend_model = %target.model_id,
            "Dispatching request"
        );

        let exec = match decision.path {
            RoutePath::Fast => self.fast.run(&request, target),
            RoutePath::Agent => self.agent.run(&request, decision.model, target).await,
        };

        let events = self.multiplexer.wrap(exec, request.id.clone());

        Ok(DispatchedStream { decision, events })
    }

    /// The model registry, for the models listing endpoint.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}
