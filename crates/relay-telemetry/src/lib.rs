//! # Relay Telemetry
//!
//! Observability for the Agent Relay.
//!
//! This crate provides:
//! - Structured logging setup
//! - In-process request tracking behind the admin stats endpoint

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;
pub mod tracker;

// Re-export main types
pub use logging::{init_logging, LoggingConfig};
pub use tracker::{RequestOutcome, RequestTracker, TrackerStats};
