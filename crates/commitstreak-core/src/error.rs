//! Core error types for commitstreak-core.
//!
//! Each collaborator gets its own thiserror enum; [`CoreError`] wraps them so a
//! run can propagate any failure with `?` and abort.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for commitstreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// State file errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Version-control errors
    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted cursor errors.
///
/// Read-side variants are recovered by the runner (it falls back to the
/// default cursor); write-side variants abort the run.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid timestamp '{value}' in state file")]
    InvalidTimestamp { value: String },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failures of the version-control collaborator.
#[derive(Error, Debug)]
pub enum VcsError {
    /// The command could not be started at all
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Inclusive range with min above max, or a min below the allowed floor
    #[error("Invalid range for '{field}': [{min}, {max}]")]
    InvalidRange { field: String, min: u32, max: u32 },

    /// The hard stop must not precede the epoch
    #[error("Hard stop {hard_stop} is before epoch {epoch}")]
    HardStopBeforeEpoch {
        epoch: chrono::NaiveDate,
        hard_stop: chrono::NaiveDate,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
