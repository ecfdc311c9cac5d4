//! Error types for parameter validation, scenario loading and attempt control

use std::path::PathBuf;

/// Rejected simulation parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
}

/// Scenario file could not be loaded or holds invalid values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    Validation { field: &'static str, message: String },
}

/// Attempt control refused by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("an attempt is already in transit")]
    InTransit,
}
