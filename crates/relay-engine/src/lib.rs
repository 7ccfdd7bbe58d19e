//! # Relay Engine
//!
//! The execution engine of the Agent Relay.
//!
//! This crate sequences the core of every request:
//! - [`FastPathExecutor`]: one streaming inference call
//! - [`AgentPathExecutor`]: sandboxed task execution with retries
//! - [`StreamMultiplexer`]: keepalives, the global ceiling, cancellation
//! - [`Dispatcher`]: classify, resolve, execute, wrap
//!
//! One independent asynchronous task serves each request; the only shared
//! mutable state is the warm pool and the backend connection pools.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent_path;
pub mod backoff;
pub mod dispatcher;
pub mod executor;
pub mod fast_path;
pub mod lease;
pub mod multiplexer;

// Re-export main types
pub use agent_path::AgentPathExecutor;
pub use backoff::BackoffCurve;
pub use dispatcher::{DispatchedStream, Dispatcher};
pub use executor::ExecutorStream;
pub use fast_path::FastPathExecutor;
pub use lease::SandboxLease;
pub use multiplexer::StreamMultiplexer;
