//! In-process request tracking.
//!
//! Keeps just enough state to answer the admin stats endpoint: which
//! requests are in flight and aggregate outcome counts. Nothing here
//! persists; the tracker restarts empty with the process.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Final outcome of a tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Stream completed with no terminal error
    Success,
    /// Stream carried a terminal error
    Failed,
    /// Caller went away before completion
    Cancelled,
}

#[derive(Debug, Clone)]
struct ActiveRequest {
    started_at: Instant,
    path: String,
}

#[derive(Debug, Default)]
struct Aggregates {
    completed: usize,
    failed: usize,
    cancelled: usize,
    total_duration: Duration,
}

/// Aggregate tracker statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStats {
    /// Requests currently in flight
    pub active_requests: usize,
    /// Requests completed successfully
    pub completed: usize,
    /// Requests ended by a terminal error
    pub failed: usize,
    /// Requests cancelled by the caller
    pub cancelled: usize,
    /// Mean wall-clock duration of finished requests, in milliseconds
    pub avg_duration_ms: f64,
}

/// Tracks in-flight requests and outcome aggregates.
#[derive(Debug, Default)]
pub struct RequestTracker {
    active: DashMap<String, ActiveRequest>,
    aggregates: Mutex<Aggregates>,
}

impl RequestTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request entering the system.
    pub fn start(&self, request_id: &str, path: &str) {
        self.active.insert(
            request_id.to_string(),
            ActiveRequest {
                started_at: Instant::now(),
                path: path.to_string(),
            },
        );
    }

    /// Record a request leaving the system.
    pub fn finish(&self, request_id: &str, outcome: RequestOutcome) {
        let Some((_, active)) = self.active.remove(request_id) else {
            return;
        };

        let mut aggregates = self.aggregates.lock();
        aggregates.total_duration += active.started_at.elapsed();
        match outcome {
            RequestOutcome::Success => aggregates.completed += 1,
            RequestOutcome::Failed => aggregates.failed += 1,
            RequestOutcome::Cancelled => aggregates.cancelled += 1,
        }
    }

    /// How many requests are currently on the given path.
    #[must_use]
    pub fn active_on_path(&self, path: &str) -> usize {
        self.active.iter().filter(|e| e.value().path == path).count()
    }

    /// Snapshot the aggregate statistics.
    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        let aggregates = self.aggregates.lock();
        let finished = aggregates.completed + aggregates.failed + aggregates.cancelled;
        let avg_duration_ms = if finished > 0 {
            aggregates.total_duration.as_millis() as f64 / finished as f64
        } else {
            0.0
        };

        TrackerStats {
            active_requests: self.active.len(),
            completed: aggregates.completed,
            failed: aggregates.failed,
            cancelled: aggregates.cancelled,
            avg_duration_ms,
        }
    }
}
