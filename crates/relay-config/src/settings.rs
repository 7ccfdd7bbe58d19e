//! Configuration types for the relay.

use relay_core::{ModelClass, RelayError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Decision classifier settings
    pub classifier: ClassifierConfig,
    /// Backend targets per model class, keyed by wire label
    pub models: HashMap<String, ModelTargetConfig>,
    /// Sandbox platform and warm pool settings
    pub sandbox: SandboxConfig,
    /// Stream multiplexer settings
    pub stream: StreamConfig,
    /// Agent-path execution settings
    pub agent: AgentConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            classifier: ClassifierConfig::default(),
            models: HashMap::new(),
            sandbox: SandboxConfig::default(),
            stream: StreamConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns error if a model class has no target, or if timer settings
    /// contradict each other.
    pub fn validate(&self) -> Result<(), RelayError> {
        for class in ModelClass::all() {
            if !self.models.contains_key(class.as_str()) {
                return Err(RelayError::configuration(format!(
                    "no backend target configured for model class '{class}'"
                )));
            }
        }

        if self.stream.keepalive_interval >= self.stream.global_timeout {
            return Err(RelayError::configuration(
                "keepalive_interval must be shorter than global_timeout",
            ));
        }

        if self.sandbox.pool.flavors.is_empty() {
            return Err(RelayError::configuration(
                "at least one sandbox flavor must be configured",
            ));
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Drain deadline for graceful shutdown
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// Decision classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Decision backend endpoint
    pub endpoint: String,
    /// Fixed small model used for classification
    pub model_id: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Latency budget for one classification call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8091/v1".to_string(),
            model_id: "relay-decider-1".to_string(),
            api_key_env: "RELAY_DECISION_API_KEY".to_string(),
            timeout: Duration::from_secs(1),
        }
    }
}

/// Backend target for one model class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTargetConfig {
    /// Wire model id the backend expects
    pub id: String,
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Default token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-call timeout
    #[serde(with = "humantime_serde", default = "default_call_timeout")]
    pub call_timeout: Duration,
}

fn default_api_key_env() -> String {
    "RELAY_BACKEND_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_call_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Sandbox platform and pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Sandbox platform control endpoint
    pub endpoint: String,
    /// Environment variable holding the platform API key
    pub api_key_env: String,
    /// Warm pool settings
    pub pool: PoolConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let mut flavors = HashMap::new();
        flavors.insert("agent-ready".to_string(), FlavorConfig::default());
        flavors.insert("headless".to_string(), FlavorConfig::default());
        Self {
            endpoint: "http://127.0.0.1:8092".to_string(),
            api_key_env: "RELAY_SANDBOX_API_KEY".to_string(),
            pool: PoolConfig {
                flavors,
                ..PoolConfig::default()
            },
        }
    }
}

/// Warm pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Per-flavor settings, keyed by flavor label
    pub flavors: HashMap<String, FlavorConfig>,
    /// Bound on synchronous (cold) creation
    #[serde(with = "humantime_serde")]
    pub create_timeout: Duration,
    /// Handles older than this are evicted by maintenance
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
    /// Handles that served this many requests are evicted
    pub max_requests: u32,
    /// Maintenance sweep cadence
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            flavors: HashMap::new(),
            create_timeout: Duration::from_secs(30),
            max_age: Duration::from_secs(30 * 60),
            max_requests: 8,
            sweep_interval: Duration::from_secs(30),
        }
    }
}

/// Per-flavor pool settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorConfig {
    /// Target count of WARM handles held ready
    pub target: usize,
}

impl Default for FlavorConfig {
    fn default() -> Self {
        Self { target: 2 }
    }
}

/// Stream multiplexer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Idle gap after which a synthetic keepalive is emitted
    #[serde(with = "humantime_serde")]
    pub keepalive_interval: Duration,
    /// Hard ceiling on total stream duration
    #[serde(with = "humantime_serde")]
    pub global_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(15),
            global_timeout: Duration::from_secs(600),
        }
    }
}

/// Agent-path execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Deadline for one sandbox event read
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
    /// Mid-stream read-timeout retries before giving up
    pub max_retries: u32,
    /// Base delay of the retry backoff curve
    #[serde(with = "humantime_serde")]
    pub backoff_base: Duration,
    /// Backoff multiplier per attempt
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 - 1.0)
    pub backoff_jitter: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            max_retries: 2,
            backoff_base: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            backoff_jitter: 0.25,
        }
    }
}
