//! # Agent Relay
//!
//! Streaming request router in front of a pool of language-model backends
//! and sandboxed agent runtimes.
//!
//! ## Features
//!
//! - Chat-completion-compatible API, streaming and non-streaming
//! - Deterministic fast/agent routing with a one-shot decision backend
//! - Warm pool of pre-provisioned sandboxes hiding cold-start latency
//! - Keepalives, a global duration ceiling, and bounded retries around
//!   multi-minute agent executions
//!
//! ## Usage
//!
//! ```bash
//! # Start with default configuration
//! agent-relay
//!
//! # Start with a custom config file
//! RELAY_CONFIG=/path/to/relay.yaml agent-relay
//!
//! # Start with environment overrides
//! RELAY_PORT=9000 agent-relay
//! ```

use relay_backends::{HttpDecisionBackend, HttpInferenceBackend};
use relay_config::{load_config, RelayConfig};
use relay_engine::{AgentPathExecutor, Dispatcher, FastPathExecutor, StreamMultiplexer};
use relay_routing::{DecisionClassifier, ModelRegistry};
use relay_sandbox::{HttpSandboxPlatform, SandboxPlatform, WarmPool};
use relay_server::{AppState, Server};
use relay_telemetry::{init_logging, LoggingConfig, RequestTracker};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = init_logging(&LoggingConfig::new().with_level("info")) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Agent Relay");

    if let Err(e) = run().await {
        error!(error = %e, "Application failed");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    let config = load_config().await?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let state = build_state(&config).await?;
    let server = Server::new(state);
    server.run().await?;

    Ok(())
}

/// Wire the dispatcher and shared state from configuration.
async fn build_state(config: &RelayConfig) -> anyhow::Result<AppState> {
    let registry = ModelRegistry::from_config(config)?;

    let decision_api_key =
        std::env::var(&config.classifier.api_key_env).unwrap_or_default();
    let decision_backend = HttpDecisionBackend::new(
        &config.classifier.endpoint,
        &config.classifier.model_id,
        decision_api_key,
        config.classifier.timeout,
    )?;
    let classifier = DecisionClassifier::new(Arc::new(decision_backend), config.classifier.timeout);

    let inference_backend = HttpInferenceBackend::new(Duration::from_secs(10))?;
    let fast = FastPathExecutor::new(Arc::new(inference_backend));

    let sandbox_api_key = std::env::var(&config.sandbox.api_key_env).unwrap_or_default();
    let platform: Arc<dyn SandboxPlatform> = Arc::new(HttpSandboxPlatform::new(
        &config.sandbox.endpoint,
        sandbox_api_key,
        Duration::from_secs(10),
    )?);

    let pool = Arc::new(WarmPool::new(
        Arc::clone(&platform),
        config.sandbox.pool.clone(),
    )?);
    pool.prewarm().await;
    let _maintenance = pool.spawn_maintenance();

    let agent = AgentPathExecutor::new(platform, Arc::clone(&pool), config.agent.clone());

    let multiplexer = StreamMultiplexer::new(config.stream.clone());

    let dispatcher = Dispatcher::new(classifier, registry, fast, agent, multiplexer);

    info!("Dispatcher wired");

    Ok(AppState::new(
        Arc::new(dispatcher),
        pool,
        Arc::new(RequestTracker::new()),
        Arc::new(config.clone()),
    ))
}
