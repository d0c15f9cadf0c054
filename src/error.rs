use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
///
/// Problems inside a document are never errors: they are reported as
/// findings on the document's `ValidationResult`.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },

    #[error("Output error: {details}")]
    Output { details: String },
}

/// Configuration-specific error types
///
/// A configuration file that exists but cannot be used is fatal to the
/// whole run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    YamlParsing(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
