//! # Relay Sandbox
//!
//! Sandbox execution contexts for the Agent Relay.
//!
//! This crate provides:
//! - The [`SandboxPlatform`] trait over the external sandbox service
//! - [`SandboxHandle`] lifecycle state
//! - The [`WarmPool`] of pre-provisioned handles hiding cold-start latency
//! - Translation from native sandbox events to relay stream events

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod handle;
pub mod platform;
pub mod platform_http;
pub mod pool;
pub mod translate;

// Re-export main types
pub use handle::{HandleState, SandboxHandle};
pub use platform::{
    ProvisionedSandbox, SandboxEvent, SandboxFlavor, SandboxId, SandboxPlatform, TaskSpec,
};
pub use platform_http::HttpSandboxPlatform;
pub use pool::{FlavorOccupancy, WarmPool};
pub use translate::translate_event;
