//! # Relay Core
//!
//! Core types, traits, and error handling for the Agent Relay.
//!
//! This crate provides the foundational types used throughout the relay:
//! - Chat-completion wire contract types
//! - The routing [`Decision`] model and its closed enumeration
//! - Stream events produced by executors
//! - Backend traits and connection targets
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod decision;
pub mod error;
pub mod event;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendTarget, DecisionBackend, InferenceBackend, InferenceCall, TextDelta};
pub use decision::{Decision, ModelClass, RoutePath};
pub use error::{RelayError, RelayResult};
pub use event::{ArtifactRef, ErrorDetail, StreamEvent};
pub use request::{
    ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent, MessageRole, RouteHint,
};
pub use response::{
    ChatChunk, ChatResponse, Choice, ChunkChoice, ChunkDelta, FinishReason, ModelObject,
    ModelsResponse, ResponseMessage, Usage,
};
pub use types::RequestId;
