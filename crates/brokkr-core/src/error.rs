//! Error types for brokkr-core

use thiserror::Error;

/// Result type alias using brokkr-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Brokkr
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed plugin spec entry
    #[error("Invalid plugin spec: {message}")]
    Spec { message: String },

    /// Circular dependency
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// Build/setup/configure failure for a single plugin
    #[error("Configuration of '{plugin}' failed: {message}")]
    Configuration { plugin: String, message: String },

    /// Error reported by the external package installer
    #[error("Installer error: {message}")]
    Installer { message: String },

    /// Unknown plugin id
    #[error("Unknown plugin: {plugin}")]
    NotFound { plugin: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a spec error
    pub fn spec(message: impl Into<String>) -> Self {
        Self::Spec {
            message: message.into(),
        }
    }

    /// Create a circular dependency error
    pub fn circular_dependency(cycle: impl Into<String>) -> Self {
        Self::CircularDependency {
            cycle: cycle.into(),
        }
    }

    /// Create a configuration error for a plugin
    pub fn configuration(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create an installer error
    pub fn installer(message: impl Into<String>) -> Self {
        Self::Installer {
            message: message.into(),
        }
    }

    /// Create an unknown plugin error
    pub fn not_found(plugin: impl Into<String>) -> Self {
        Self::NotFound {
            plugin: plugin.into(),
        }
    }
}
