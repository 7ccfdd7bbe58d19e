//! Graceful shutdown handling for the relay.
//!
//! Long-lived agent streams make abrupt shutdown expensive: a killed
//! connection looks to the caller like a silent truncation. The coordinator
//! waits for a signal, stops accepting new work, and gives in-flight
//! streams a bounded drain window before the process exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Coordinates signal handling and connection draining.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    notify: Notify,
    triggered: AtomicBool,
    grace: Duration,
}

impl ShutdownCoordinator {
    /// Create a coordinator with the given drain window.
    #[must_use]
    pub fn new(grace: Duration) -> Arc<Self> {
        Arc::new(Self {
            notify: Notify::new(),
            triggered: AtomicBool::new(false),
            grace,
        })
    }

    /// Trigger shutdown programmatically.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("Shutdown triggered");
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown is requested.
    pub async fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        self.notify.notified().await;
    }

    /// The configured drain window.
    #[must_use]
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Listen for SIGINT/SIGTERM and trigger on the first one.
    pub fn listen_for_signals(self: &Arc<Self>) {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for ctrl-c");
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sig) => {
                        sig.recv().await;
                    }
                    Err(e) => warn!(error = %e, "Failed to listen for SIGTERM"),
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                () = ctrl_c => {},
                () = terminate => {},
            }

            coordinator.trigger();
        });
    }
}
