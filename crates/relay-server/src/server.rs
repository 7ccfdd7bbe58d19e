//! The HTTP server.

use crate::routes::create_router;
use crate::shutdown::ShutdownCoordinator;
use crate::state::AppState;
use relay_core::RelayError;
use std::sync::Arc;
use tracing::info;

/// Axum server wrapper with graceful shutdown.
pub struct Server {
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Server {
    /// Create the server over shared state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let shutdown = ShutdownCoordinator::new(state.config.server.shutdown_grace);
        Self { state, shutdown }
    }

    /// The shutdown coordinator, for external triggering.
    #[must_use]
    pub fn shutdown(&self) -> Arc<ShutdownCoordinator> {
        Arc::clone(&self.shutdown)
    }

    /// Bind and serve until shutdown.
    ///
    /// # Errors
    /// Returns error if binding fails or the server errors out.
    pub async fn run(self) -> Result<(), RelayError> {
        let addr = format!(
            "{}:{}",
            self.state.config.server.host, self.state.config.server.port
        );

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RelayError::configuration(format!("failed to bind {addr}: {e}")))?;

        info!(addr = %addr, "Relay listening");

        self.shutdown.listen_for_signals();
        let shutdown = Arc::clone(&self.shutdown);
        let grace = shutdown.grace();

        let app = create_router(self.state);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                info!(grace = ?grace, "Draining in-flight requests");
            })
            .await
            .map_err(|e| RelayError::internal(format!("server error: {e}")))?;

        info!("Server stopped");
        Ok(())
    }
}
