//! # Relay Server
//!
//! HTTP server for the Agent Relay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The chat-completion-compatible endpoint, streaming and non-streaming
//! - Health and admin endpoints
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use routes::create_router;
pub use server::Server;
pub use shutdown::ShutdownCoordinator;
pub use state::AppState;
