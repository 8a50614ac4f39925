//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - invalid manifest, reference or index
pub const INPUT_ERROR: i32 = 2;

/// Resolution error - the dependency graph could not be resolved
pub const RESOLUTION_ERROR: i32 = 3;

/// Manifest error - no manifest at the given path
pub const MANIFEST_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
