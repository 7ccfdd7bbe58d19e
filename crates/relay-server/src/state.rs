//! Shared application state.

use relay_config::RelayConfig;
use relay_engine::Dispatcher;
use relay_sandbox::WarmPool;
use relay_telemetry::RequestTracker;
use std::sync::Arc;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The request dispatcher
    pub dispatcher: Arc<Dispatcher>,
    /// The warm pool, exposed for the admin occupancy endpoint
    pub pool: Arc<WarmPool>,
    /// Request tracker behind the admin stats endpoint
    pub tracker: Arc<RequestTracker>,
    /// Loaded configuration
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Assemble the application state.
    #[must_use]
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        pool: Arc<WarmPool>,
        tracker: Arc<RequestTracker>,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            dispatcher,
            pool,
            tracker,
            config,
        }
    }
}
