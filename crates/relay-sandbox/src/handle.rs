//! Sandbox handle lifecycle state.

use crate::platform::{ProvisionedSandbox, SandboxFlavor, SandboxId};
use tokio::time::Instant;

/// Lifecycle state of a pooled sandbox handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Provisioned and idle in the pool
    Warm,
    /// Exclusively owned by one in-flight request
    Assigned,
    /// Marked for eviction, no longer handed out
    Draining,
    /// Terminated on the platform
    Terminated,
}

/// A pooled sandbox execution context.
///
/// While `Assigned`, the handle is exclusively owned by the holding request;
/// no other task touches it until it is released back to the pool.
#[derive(Debug, Clone)]
pub struct SandboxHandle {
    sandbox: ProvisionedSandbox,
    /// Flavor this handle was provisioned as
    pub flavor: SandboxFlavor,
    /// Provisioning time
    pub created_at: Instant,
    /// Last assignment time
    pub last_used_at: Instant,
    /// Number of requests this handle has served
    pub request_count: u32,
    /// Current lifecycle state
    pub state: HandleState,
}

impl SandboxHandle {
    /// Wrap a freshly provisioned sandbox as a WARM handle.
    #[must_use]
    pub fn warm(sandbox: ProvisionedSandbox, flavor: SandboxFlavor) -> Self {
        let now = Instant::now();
        Self {
            sandbox,
            flavor,
            created_at: now,
            last_used_at: now,
            request_count: 0,
            state: HandleState::Warm,
        }
    }

    /// Platform id of the underlying sandbox.
    #[must_use]
    pub fn id(&self) -> &SandboxId {
        &self.sandbox.id
    }

    /// Public base URL of the underlying sandbox.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.sandbox.base_url
    }

    /// The provisioned sandbox itself, for platform calls.
    #[must_use]
    pub fn sandbox(&self) -> &ProvisionedSandbox {
        &self.sandbox
    }

    /// Transition to ASSIGNED, bumping usage accounting.
    pub fn assign(&mut self) {
        self.state = HandleState::Assigned;
        self.last_used_at = Instant::now();
        self.request_count += 1;
    }

    /// Transition back to WARM after a clean reset.
    pub fn rewarm(&mut self) {
        self.state = HandleState::Warm;
    }

    /// Whether maintenance should evict this handle.
    #[must_use]
    pub fn is_expired(&self, max_age: std::time::Duration, max_requests: u32) -> bool {
        self.created_at.elapsed() >= max_age || self.request_count >= max_requests
    }
}
