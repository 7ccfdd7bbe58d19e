//! The warm pool of pre-provisioned sandbox handles.
//!
//! The pool hides sandbox cold-start latency behind a per-flavor queue of
//! WARM handles, refilled in the background after every removal. It is an
//! owned object passed through the dispatcher, never an ambient global; each
//! flavor's queue sits behind its own mutex and is mutated only through
//! `acquire`/`release` and the maintenance sweep.

use crate::handle::{HandleState, SandboxHandle};
use crate::platform::{SandboxFlavor, SandboxPlatform};
use relay_config::PoolConfig;
use relay_core::RelayError;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Snapshot of one flavor's pool occupancy, for the admin surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FlavorOccupancy {
    /// Flavor label
    pub flavor: String,
    /// WARM handles currently queued
    pub warm: usize,
    /// Configured target
    pub target: usize,
}

struct Shelf {
    target: usize,
    ready: Mutex<VecDeque<SandboxHandle>>,
}

/// Pool of pre-provisioned sandbox handles, one queue per flavor.
pub struct WarmPool {
    platform: Arc<dyn SandboxPlatform>,
    config: PoolConfig,
    shelves: HashMap<SandboxFlavor, Shelf>,
}

impl WarmPool {
    /// Build the pool from configuration. Queues start empty; call
    /// [`WarmPool::prewarm`] to fill them ahead of traffic.
    ///
    /// # Errors
    /// Returns error if configuration names an unknown flavor.
    pub fn new(platform: Arc<dyn SandboxPlatform>, config: PoolConfig) -> Result<Self, RelayError> {
        let mut shelves = HashMap::new();

        for (label, flavor_config) in &config.flavors {
            let flavor = SandboxFlavor::from_label(label).ok_or_else(|| {
                RelayError::configuration(format!("unknown sandbox flavor '{label}'"))
            })?;
            shelves.insert(
                flavor,
                Shelf {
                    target: flavor_config.target,
                    ready: Mutex::new(VecDeque::new()),
                },
            );
        }

        Ok(Self {
            platform,
            config,
            shelves,
        })
    }

    /// Fill every shelf to its target. Creation failures are logged and
    /// skipped; the pool serves cold creates until maintenance catches up.
    pub async fn prewarm(&self) {
        for (flavor, shelf) in &self.shelves {
            let deficit = {
                let ready = shelf.ready.lock().await;
                shelf.target.saturating_sub(ready.len())
            };
            for _ in 0..deficit {
                if let Err(e) = self.refill_one(*flavor).await {
                    warn!(flavor = %flavor, error = %e, "Prewarm creation failed");
                }
            }
        }
        info!("Warm pool prewarmed");
    }

    /// Acquire an ASSIGNED handle of the given flavor.
    ///
    /// Pops a WARM handle when one is queued, otherwise creates one on the
    /// cold path, bounded by the platform creation timeout.
    ///
    /// # Errors
    /// Returns [`RelayError::SandboxUnavailable`] when the platform cannot
    /// provision in time; the caller decides retry vs. report.
    pub async fn acquire(self: &Arc<Self>, flavor: SandboxFlavor) -> Result<SandboxHandle, RelayError> {
        let shelf = self.shelf(flavor)?;

        let popped = shelf.ready.lock().await.pop_front();

        if let Some(mut handle) = popped {
            handle.assign();
            debug!(flavor = %flavor, sandbox = %handle.id(), "Acquired warm handle");

            // Refill behind the removal without blocking the request.
            let pool = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = pool.refill_one(flavor).await {
                    warn!(flavor = %flavor, error = %e, "Background refill failed");
                }
            });

            return Ok(handle);
        }

        debug!(flavor = %flavor, "Pool empty, creating on the cold path");
        let sandbox = tokio::time::timeout(
            self.config.create_timeout,
            self.platform.create(flavor),
        )
        .await
        .map_err(|_| {
            RelayError::sandbox_unavailable(format!(
                "creation timed out after {:?}",
                self.config.create_timeout
            ))
        })??;

        let mut handle = SandboxHandle::warm(sandbox, flavor);
        handle.assign();
        Ok(handle)
    }

    /// Release a handle back to the pool.
    ///
    /// `reusable=true` resets the sandbox to baseline and requeues it while
    /// the shelf is below target; anything else terminates. `reusable=false`
    /// always terminates — post-error internal state is untrusted.
    pub async fn release(&self, mut handle: SandboxHandle, reusable: bool) {
        let expired = handle.is_expired(self.config.max_age, self.config.max_requests);

        if !reusable || expired {
            self.terminate_handle(&mut handle).await;
            return;
        }

        let Ok(shelf) = self.shelf(handle.flavor) else {
            self.terminate_handle(&mut handle).await;
            return;
        };

        if shelf.ready.lock().await.len() >= shelf.target {
            debug!(sandbox = %handle.id(), "Shelf at target, terminating surplus handle");
            self.terminate_handle(&mut handle).await;
            return;
        }

        if let Err(e) = self.platform.reset(handle.id()).await {
            warn!(sandbox = %handle.id(), error = %e, "Reset failed, terminating");
            self.terminate_handle(&mut handle).await;
            return;
        }

        handle.rewarm();
        let mut ready = shelf.ready.lock().await;
        if ready.len() < shelf.target {
            debug!(sandbox = %handle.id(), "Handle returned to pool");
            ready.push_back(handle);
        } else {
            drop(ready);
            self.terminate_handle(&mut handle).await;
        }
    }

    /// Spawn the background maintenance task: evicts handles past max age or
    /// max request count and tops shelves back up to target.
    #[must_use]
    pub fn spawn_maintenance(self: &Arc<Self>) -> JoinHandle<()> {
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(pool.config.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                pool.sweep().await;
            }
        })
    }

    /// One maintenance pass over every shelf.
    pub async fn sweep(&self) {
        for (flavor, shelf) in &self.shelves {
            let mut expired = Vec::new();
            {
                let mut ready = shelf.ready.lock().await;
                ready.retain_mut(|handle| {
                    if handle.is_expired(self.config.max_age, self.config.max_requests) {
                        handle.state = HandleState::Draining;
                        expired.push(handle.clone());
                        false
                    } else {
                        true
                    }
                });
            }

            for mut handle in expired {
                debug!(flavor = %flavor, sandbox = %handle.id(), "Evicting expired handle");
                self.terminate_handle(&mut handle).await;
            }

            let deficit = {
                let ready = shelf.ready.lock().await;
                shelf.target.saturating_sub(ready.len())
            };
            for _ in 0..deficit {
                if let Err(e) = self.refill_one(*flavor).await {
                    warn!(flavor = %flavor, error = %e, "Maintenance refill failed");
                    break;
                }
            }
        }
    }

    /// Current occupancy per flavor.
    pub async fn occupancy(&self) -> Vec<FlavorOccupancy> {
        let mut snapshot = Vec::with_capacity(self.shelves.len());
        for (flavor, shelf) in &self.shelves {
            snapshot.push(FlavorOccupancy {
                flavor: flavor.to_string(),
                warm: shelf.ready.lock().await.len(),
                target: shelf.target,
            });
        }
        snapshot.sort_by(|a, b| a.flavor.cmp(&b.flavor));
        snapshot
    }

    fn shelf(&self, flavor: SandboxFlavor) -> Result<&Shelf, RelayError> {
        self.shelves.get(&flavor).ok_or_else(|| {
            RelayError::configuration(format!("flavor '{flavor}' has no configured pool"))
        })
    }

    /// Create one handle and queue it, unless the shelf is already at
    /// target by the time creation finishes.
    async fn refill_one(&self, flavor: SandboxFlavor) -> Result<(), RelayError> {
        let shelf = self.shelf(flavor)?;

        {
            let ready = shelf.ready.lock().await;
            if ready.len() >= shelf.target {
                return Ok(());
            }
        }

        // Create outside the lock; provisioning can take seconds.
        let sandbox = self.platform.create(flavor).await?;
        let mut handle = SandboxHandle::warm(sandbox, flavor);

        let mut ready = shelf.ready.lock().await;
        if ready.len() < shelf.target {
            ready.push_back(handle);
        } else {
            drop(ready);
            self.terminate_handle(&mut handle).await;
        }
        Ok(())
    }

    async fn terminate_handle(&self, handle: &mut SandboxHandle) {
        handle.state = HandleState::Terminated;
        if let Err(e) = self.platform.terminate(handle.id()).await {
            warn!(sandbox = %handle.id(), error = %e, "Terminate failed");
        }
    }
}
