//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid identity: '{field}' cannot be empty or whitespace (got {value:?})")]
    InvalidIdentity { field: &'static str, value: String },

    #[error("Invalid coordinate '{coordinate}': {message}")]
    InvalidCoordinate { coordinate: String, message: String },

    #[error("Unknown dependency scope: {0}")]
    UnknownScope(String),

    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("Failed to parse manifest: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid dependency graph: {message}")]
    InvalidGraph { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Build an identity error for a blank required field
    pub fn invalid_identity(field: &'static str, value: &str) -> Self {
        Self::InvalidIdentity {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
