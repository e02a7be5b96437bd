//! Runtime configuration.
//!
//! Every field has a default, so a configuration file only lists what it
//! overrides:
//!
//! ```toml
//! [bus]
//! queue_warning_threshold = 4096
//!
//! [scheduler]
//! announce_initialized = false
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration of a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub bus: BusConfig,
    pub scheduler: SchedulerConfig,
}

impl RuntimeConfig {
    /// Parses a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

/// Settings shared by the event bus and the command bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Deferred queue length above which a warning is logged. `0` disables
    /// the warning.
    pub queue_warning_threshold: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_warning_threshold: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Post [`AllServicesInitialized`](crate::AllServicesInitialized) once
    /// every service has finished initializing.
    pub announce_initialized: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            announce_initialized: true,
        }
    }
}
