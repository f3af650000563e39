//! Error types for the settings crate.

use std::io;
use thiserror::Error;
use weldpath_core::ConfigurationError;

/// Errors that can occur while loading, saving or converting a build config.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be loaded.
    #[error("Failed to load settings from {path}: {source}")]
    LoadError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be saved.
    #[error("Failed to save settings to {path}: {source}")]
    SaveError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The file extension is neither `.json` nor `.toml`.
    #[error("Unsupported config format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// The settings describe an impossible build.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::InvalidSetting {
            key: "build.layer_count".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'build.layer_count': must be at least 1"
        );

        let err = SettingsError::UnsupportedFormat("yaml".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported config format: yaml (expected .json or .toml)"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: SettingsError = ConfigurationError::ZeroVector {
            name: "main_axis".to_string(),
        }
        .into();
        assert!(matches!(err, SettingsError::Configuration(_)));
        assert_eq!(err.to_string(), "main_axis must have non-zero magnitude");
    }
}
