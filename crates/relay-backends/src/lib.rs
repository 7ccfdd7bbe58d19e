//! # Relay Backends
//!
//! HTTP backend clients for the Agent Relay.
//!
//! This crate provides the outbound side of the relay:
//! - [`HttpInferenceBackend`]: streaming chat completions over SSE
//! - [`HttpDecisionBackend`]: one-shot classification calls
//!
//! Both speak the common chat-completion wire contract.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod inference;
mod wire;

pub use decision::HttpDecisionBackend;
pub use inference::HttpInferenceBackend;
