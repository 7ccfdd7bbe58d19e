//! Shared fixtures: a fully wired in-process relay over mocks.

use crate::mock_backends::{MockDecisionBackend, MockInferenceBackend, MockSandboxPlatform};
use once_cell::sync::Lazy;
use relay_config::{AgentConfig, FlavorConfig, PoolConfig, RelayConfig, StreamConfig};
use relay_core::{
    BackendTarget, ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent, MessageRole,
    ModelClass, RequestId, RouteHint,
};
use relay_engine::{AgentPathExecutor, Dispatcher, FastPathExecutor, StreamMultiplexer};
use relay_routing::{DecisionClassifier, ModelRegistry};
use relay_sandbox::{SandboxPlatform, WarmPool};
use relay_server::AppState;
use relay_telemetry::RequestTracker;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
});

/// Initialize test tracing once.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// A wired relay plus handles to its mocks.
pub struct TestRelay {
    /// The dispatcher under test
    pub dispatcher: Arc<Dispatcher>,
    /// The warm pool backing the agent path
    pub pool: Arc<WarmPool>,
    /// Request tracker
    pub tracker: Arc<RequestTracker>,
    /// Decision backend mock
    pub decision: Arc<MockDecisionBackend>,
    /// Inference backend mock
    pub inference: Arc<MockInferenceBackend>,
    /// Sandbox platform mock
    pub platform: Arc<MockSandboxPlatform>,
    config: RelayConfig,
}

impl TestRelay {
    /// Application state over the wired dispatcher, for router tests.
    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.pool),
            Arc::clone(&self.tracker),
            Arc::new(self.config.clone()),
        )
    }
}

/// Builder for [`TestRelay`].
pub struct TestRelayBuilder {
    decision: Arc<MockDecisionBackend>,
    inference: Arc<MockInferenceBackend>,
    platform: Arc<MockSandboxPlatform>,
    pool_target: usize,
    agent: AgentConfig,
    stream: StreamConfig,
}

impl Default for TestRelayBuilder {
    fn default() -> Self {
        Self {
            decision: MockDecisionBackend::replying(r#"{"path":"fast","model":"plain"}"#),
            inference: MockInferenceBackend::streaming(vec![]),
            platform: MockSandboxPlatform::scripted(vec![]),
            pool_target: 0,
            agent: AgentConfig {
                read_timeout: Duration::from_millis(50),
                max_retries: 2,
                backoff_base: Duration::from_millis(1),
                backoff_multiplier: 2.0,
                backoff_jitter: 0.0,
            },
            stream: StreamConfig {
                keepalive_interval: Duration::from_secs(15),
                global_timeout: Duration::from_secs(600),
            },
        }
    }
}

impl TestRelayBuilder {
    /// Start from defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this decision backend.
    pub fn decision(mut self, decision: Arc<MockDecisionBackend>) -> Self {
        self.decision = decision;
        self
    }

    /// Use this inference backend.
    pub fn inference(mut self, inference: Arc<MockInferenceBackend>) -> Self {
        self.inference = inference;
        self
    }

    /// Use this sandbox platform.
    pub fn platform(mut self, platform: Arc<MockSandboxPlatform>) -> Self {
        self.platform = platform;
        self
    }

    /// Warm handles held per flavor.
    pub fn pool_target(mut self, target: usize) -> Self {
        self.pool_target = target;
        self
    }

    /// Override agent execution settings.
    pub fn agent_config(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Override stream multiplexer settings.
    pub fn stream_config(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Wire everything up.
    pub fn build(self) -> TestRelay {
        init_tracing();

        let classifier = DecisionClassifier::new(self.decision.clone(), Duration::from_secs(1));

        let targets: HashMap<ModelClass, BackendTarget> = ModelClass::all()
            .iter()
            .map(|class| {
                (
                    *class,
                    BackendTarget::new(
                        format!("backend-{class}"),
                        "http://127.0.0.1:8090/v1",
                        "test-key",
                    ),
                )
            })
            .collect();
        let registry = ModelRegistry::from_targets(targets).expect("registry");

        let fast = FastPathExecutor::new(self.inference.clone());

        let mut flavors = HashMap::new();
        flavors.insert(
            "agent-ready".to_string(),
            FlavorConfig {
                target: self.pool_target,
            },
        );
        flavors.insert(
            "headless".to_string(),
            FlavorConfig {
                target: self.pool_target,
            },
        );
        let pool_config = PoolConfig {
            flavors,
            create_timeout: Duration::from_secs(5),
            max_age: Duration::from_secs(1800),
            max_requests: 8,
            sweep_interval: Duration::from_secs(30),
        };
        let pool = Arc::new(
            WarmPool::new(
                self.platform.clone() as Arc<dyn SandboxPlatform>,
                pool_config,
            )
            .expect("pool"),
        );

        let agent = AgentPathExecutor::new(
            self.platform.clone() as Arc<dyn SandboxPlatform>,
            Arc::clone(&pool),
            self.agent.clone(),
        );

        let multiplexer = StreamMultiplexer::new(self.stream.clone());

        let dispatcher = Arc::new(Dispatcher::new(
            classifier,
            registry,
            fast,
            agent,
            multiplexer,
        ));

        let mut config = RelayConfig::default();
        config.stream = self.stream;
        config.agent = self.agent;

        TestRelay {
            dispatcher,
            pool,
            tracker: Arc::new(RequestTracker::new()),
            decision: self.decision,
            inference: self.inference,
            platform: self.platform,
            config,
        }
    }
}

/// A plain text user request.
pub fn user_request(text: &str) -> ChatRequest {
    ChatRequest {
        id: RequestId::generate(),
        model: "relay".to_string(),
        messages: vec![ChatMessage::user(text)],
        max_tokens: None,
        stream: true,
        route_hint: None,
    }
}

/// A request carrying a routing hint.
pub fn hinted_request(text: &str, path: &str, model: &str) -> ChatRequest {
    let mut request = user_request(text);
    request.route_hint = Some(RouteHint {
        path: path.to_string(),
        model: model.to_string(),
    });
    request
}

/// A request whose user message carries an image part.
pub fn image_request(text: &str, image_url: &str) -> ChatRequest {
    let mut request = user_request(text);
    request.messages = vec![ChatMessage {
        role: MessageRole::User,
        content: MessageContent::Parts(vec![
            ContentPart::Text {
                text: text.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image_url.to_string(),
                },
            },
        ]),
        name: None,
    }];
    request
}
