//! Exactly-once sandbox release.
//!
//! A [`SandboxLease`] wraps an ASSIGNED handle so that release happens on
//! every exit path — success, failure, cancellation, timeout — exactly once,
//! structurally rather than by caller discipline. The executor and the
//! multiplexer each hold a clone; whichever releases first wins, and if
//! neither did (the owning future was dropped mid-flight), the lease's drop
//! terminates the sandbox in the background.

use relay_sandbox::{SandboxHandle, WarmPool};
use std::sync::{Arc, Mutex};
use tracing::debug;

struct LeaseInner {
    pool: Arc<WarmPool>,
    slot: Mutex<Option<SandboxHandle>>,
}

impl Drop for LeaseInner {
    fn drop(&mut self) {
        let handle = self.slot.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            debug!(sandbox = %handle.id(), "Lease dropped unreleased, terminating");
            let pool = Arc::clone(&self.pool);
            if let Ok(rt) = tokio::runtime::Handle::try_current() {
                rt.spawn(async move {
                    pool.release(handle, false).await;
                });
            }
        }
    }
}

/// Shared, exactly-once release token for one acquired sandbox handle.
#[derive(Clone)]
pub struct SandboxLease {
    inner: Arc<LeaseInner>,
}

impl SandboxLease {
    /// Wrap an acquired handle.
    #[must_use]
    pub fn new(pool: Arc<WarmPool>, handle: SandboxHandle) -> Self {
        Self {
            inner: Arc::new(LeaseInner {
                pool,
                slot: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Release the handle back to the pool. Later calls are no-ops.
    ///
    /// The pool call runs on its own task so that cancelling the caller
    /// mid-release cannot strand the handle; awaiting the join handle is
    /// cancel-safe.
    pub async fn release(&self, reusable: bool) {
        let handle = self
            .inner
            .slot
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            let pool = Arc::clone(&self.inner.pool);
            let done = tokio::spawn(async move {
                pool.release(handle, reusable).await;
            });
            let _ = done.await;
        }
    }

    /// Release without awaiting, from synchronous or cancellation contexts.
    pub fn release_detached(&self, reusable: bool) {
        let handle = self
            .inner
            .slot
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            let pool = Arc::clone(&self.inner.pool);
            tokio::spawn(async move {
                pool.release(handle, reusable).await;
            });
        }
    }

    /// Whether the handle has already been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner
            .slot
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }
}
