//! CLI error types with exit code handling
//!
//! Maps library errors onto a small set of categories, each with its own
//! exit code, so scripts can tell bad input from a failed resolution.

use mavenref_core::CoreError;
use mavenref_resolve::ResolveError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid manifest, reference or index
    #[error("Invalid input: {message}")]
    #[diagnostic(code(mavenref::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// No manifest where one was expected
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(mavenref::cli::manifest),
        help("Pass a mavenref.yaml file or a directory containing one")
    )]
    Manifest { message: String },

    /// The oracle could not resolve the graph
    #[error("Resolution failed: {message}")]
    #[diagnostic(code(mavenref::cli::resolution))]
    Resolution {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(mavenref::cli::io))]
    Io { message: String },

    /// Anything else
    #[error("{message}")]
    #[diagnostic(code(mavenref::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Manifest { .. } => exit_codes::MANIFEST_ERROR,
            CliError::Resolution { .. } => exit_codes::RESOLUTION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ManifestNotFound { .. } => CliError::Manifest {
                message: err.to_string(),
            },
            CoreError::Io(e) => CliError::from(e),
            CoreError::InvalidIdentity { .. } => CliError::Input {
                message: err.to_string(),
                help: Some("groupId, artifactId and version must not be blank".to_string()),
            },
            other => CliError::input(other.to_string()),
        }
    }
}

impl From<ResolveError> for CliError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Core(e) => CliError::from(e),
            ResolveError::Io(e) => CliError::from(e),
            e if e.is_input_error() => CliError::input(e.to_string()),
            e if e.is_resolution_failure() => CliError::Resolution {
                message: e.to_string(),
                help: Some("Check that every reference is present in the index".to_string()),
            },
            e if e.is_cache_error() => CliError::Io {
                message: e.to_string(),
            },
            e => CliError::Other {
                message: e.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        let input: CliError = ResolveError::InvalidIndex {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(input.exit_code(), exit_codes::INPUT_ERROR);

        let resolution: CliError = ResolveError::graph("no root").into();
        assert_eq!(resolution.exit_code(), exit_codes::RESOLUTION_ERROR);

        let manifest: CliError = CoreError::ManifestNotFound {
            path: "mavenref.yaml".to_string(),
        }
        .into();
        assert_eq!(manifest.exit_code(), exit_codes::MANIFEST_ERROR);

        let identity: CliError =
            ResolveError::Core(CoreError::invalid_identity("version", "")).into();
        assert_eq!(identity.exit_code(), exit_codes::INPUT_ERROR);
    }
}
