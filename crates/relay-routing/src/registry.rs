//! The model registry.
//!
//! Maps a decision's model class to concrete backend connection parameters.
//! The registry is built once at startup from configuration and validated to
//! cover every class, so lookups during request handling cannot miss.

use relay_config::RelayConfig;
use relay_core::{BackendTarget, ModelClass, ModelObject, RelayError};
use std::collections::HashMap;
use tracing::warn;

/// Registry of backend targets per model class.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    targets: HashMap<ModelClass, BackendTarget>,
}

impl ModelRegistry {
    /// Build the registry from configuration.
    ///
    /// API keys are read from each target's `api_key_env` variable; a
    /// missing variable leaves the key empty and logs a warning, so local
    /// setups against unauthenticated backends still work.
    ///
    /// # Errors
    /// Returns error if any model class has no configured target.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut targets = HashMap::new();

        for class in ModelClass::all() {
            let entry = config.models.get(class.as_str()).ok_or_else(|| {
                RelayError::configuration(format!(
                    "no backend target configured for model class '{class}'"
                ))
            })?;

            let api_key = std::env::var(&entry.api_key_env).unwrap_or_else(|_| {
                warn!(
                    model_class = %class,
                    env = %entry.api_key_env,
                    "API key variable not set, using empty key"
                );
                String::new()
            });

            targets.insert(
                *class,
                BackendTarget::new(&entry.id, &entry.endpoint, api_key)
                    .with_max_tokens(entry.max_tokens)
                    .with_call_timeout(entry.call_timeout),
            );
        }

        Ok(Self { targets })
    }

    /// Build a registry directly from targets. Test seam.
    ///
    /// # Errors
    /// Returns error if any model class is missing.
    pub fn from_targets(targets: HashMap<ModelClass, BackendTarget>) -> Result<Self, RelayError> {
        for class in ModelClass::all() {
            if !targets.contains_key(class) {
                return Err(RelayError::configuration(format!(
                    "registry is missing model class '{class}'"
                )));
            }
        }
        Ok(Self { targets })
    }

    /// Resolve a model class to its backend target.
    ///
    /// # Errors
    /// Returns an internal error if the class is somehow absent; the
    /// constructors make this unreachable for validated registries.
    pub fn resolve(&self, class: ModelClass) -> Result<BackendTarget, RelayError> {
        self.targets
            .get(&class)
            .cloned()
            .ok_or_else(|| RelayError::internal(format!("registry lost model class '{class}'")))
    }

    /// Wire model listing for the models endpoint.
    #[must_use]
    pub fn list_models(&self) -> Vec<ModelObject> {
        let mut models: Vec<ModelObject> = self
            .targets
            .values()
            .map(|t| ModelObject::new(&t.model_id, "relay"))
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        models.dedup_by(|a, b| a.id == b.id);
        models
    }
}
