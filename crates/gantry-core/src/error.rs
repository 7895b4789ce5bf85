//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry core operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Variant catalog and normalization errors
    #[error(transparent)]
    Variant(#[from] VariantError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing or rendering error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Variant catalog and normalization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    /// Override with an empty key
    #[error("Variant override #{position} has an empty key")]
    EmptyKey { position: usize },

    /// Override with an empty value
    #[error("Variant override '{key}' has an empty value")]
    EmptyValue { key: String },

    /// Key is not a usable environment variable name
    #[error("Invalid environment variable name in variant: '{0}'")]
    InvalidKey(String),

    /// Override string is not in KEY=VALUE form
    #[error("Malformed variant override '{0}', expected KEY=VALUE")]
    Malformed(String),

    /// Descriptor without any overrides
    #[error("Variant descriptor has no overrides")]
    EmptyDescriptor,

    /// Catalog without any variants
    #[error("Variant catalog is empty")]
    EmptyCatalog,

    /// Selection index past the end of the catalog
    #[error("Variant index {index} is out of range (catalog has {len} variants, valid indexes 0..={})", .len.saturating_sub(1))]
    IndexOutOfRange { index: usize, len: usize },

    /// No target operating system after applying overrides
    #[error("Variant '{variant}' does not resolve a target operating system ({key} is unset)")]
    MissingTargetOs { variant: String, key: &'static str },
}
