use serde::{Deserialize, Serialize};

use redlilium_runtime::ConfigError;

/// Settings of the [`HydrationPipeline`](crate::HydrationPipeline).
///
/// ```toml
/// cache_hydrated = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
    /// Keep hydrated primitives so later requests for the same id complete
    /// without rebuilding.
    pub cache_hydrated: bool,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            cache_hydrated: true,
        }
    }
}

impl HydrationConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}
