//! # Relay Config
//!
//! Configuration loading for the Agent Relay.
//!
//! Configuration comes from a YAML file (path via `RELAY_CONFIG`, default
//! `relay.yaml`) with environment-variable overrides for deployment knobs.
//! All durations use humantime notation (`15s`, `10m`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loader;
pub mod settings;

pub use loader::load_config;
pub use settings::{
    AgentConfig, ClassifierConfig, FlavorConfig, ModelTargetConfig, PoolConfig, RelayConfig,
    SandboxConfig, ServerConfig, StreamConfig,
};
