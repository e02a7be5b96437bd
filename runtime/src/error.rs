use thiserror::Error;

/// A service could not be initialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service `{service}`: {message}")]
pub struct ServiceError {
    /// Name of the failing service.
    pub service: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Failure to load a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
