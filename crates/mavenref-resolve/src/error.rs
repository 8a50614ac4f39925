//! Error types for resolution operations

use mavenref_core::{CoreError, Coordinate};
use thiserror::Error;

/// Resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    // ============ Input Errors ============
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid artifact index: {message}")]
    InvalidIndex { message: String },

    // ============ Resolution Errors ============
    #[error("Dependency graph resolution failed: {message}")]
    GraphResolution { message: String },

    #[error("Artifact not resolved: {coordinate}")]
    ArtifactNotResolved { coordinate: Coordinate },

    // ============ Cache Errors ============
    #[error("Failed to read cache file {path}: {message}")]
    CacheRead { path: String, message: String },

    #[error("Failed to write cache file {path}: {message}")]
    CacheWrite { path: String, message: String },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    pub fn graph(message: impl Into<String>) -> Self {
        Self::GraphResolution {
            message: message.into(),
        }
    }

    /// Configuration or input problem the caller can fix
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Core(_) | Self::InvalidIndex { .. })
    }

    /// The oracle could not produce what was asked of it
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::GraphResolution { .. } | Self::ArtifactNotResolved { .. }
        )
    }

    /// Soft failures that never abort a run
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Self::CacheRead { .. } | Self::CacheWrite { .. })
    }
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;
