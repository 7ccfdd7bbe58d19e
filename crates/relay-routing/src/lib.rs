//! # Relay Routing
//!
//! Routing decision-making for the Agent Relay.
//!
//! This crate provides:
//! - The decision classifier, producing exactly one [`Decision`] per request
//! - The model registry, resolving model classes to backend targets
//!
//! [`Decision`]: relay_core::Decision

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod registry;

// Re-export main types
pub use classifier::DecisionClassifier;
pub use registry::ModelRegistry;
