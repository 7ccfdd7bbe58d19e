//! Configuration file loading with environment overrides.

use crate::settings::RelayConfig;
use relay_core::RelayError;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming the config file path.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "relay.yaml";

/// Load configuration from file and environment.
///
/// Resolution order: `RELAY_CONFIG` path, then `relay.yaml` in the working
/// directory, then built-in defaults. `RELAY_HOST` and `RELAY_PORT`
/// override the file afterwards.
///
/// # Errors
/// Returns error if an existing file cannot be read or parsed, or if the
/// resulting configuration fails validation.
pub async fn load_config() -> Result<RelayConfig, RelayError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&path).exists() {
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RelayError::configuration(format!("failed to read '{path}': {e}")))?;
        let config: RelayConfig = serde_yaml::from_str(&contents)
            .map_err(|e| RelayError::configuration(format!("failed to parse '{path}': {e}")))?;
        info!(path = %path, "Configuration loaded");
        config
    } else {
        warn!(path = %path, "Config file not found, using defaults");
        RelayConfig::default()
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Apply `RELAY_*` environment overrides on top of file values.
fn apply_env_overrides(config: &mut RelayConfig) -> Result<(), RelayError> {
    if let Ok(host) = std::env::var("RELAY_HOST") {
        config.server.host = host;
    }

    if let Ok(port) = std::env::var("RELAY_PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| RelayError::configuration(format!("invalid RELAY_PORT '{port}'")))?;
    }

    Ok(())
}
