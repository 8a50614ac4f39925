//! mavenref Core - Core types for resolving Maven references into build items
//!
//! This crate provides the foundational types used throughout mavenref:
//! - `DeclaredDependency`: A top-level Maven reference as declared by a project
//! - `RepositoryDescriptor`: A remote repository (id + url)
//! - `DependencyNode`: The resolved dependency graph handed back by an oracle
//! - `OutputItem`: One reference item per distinct resolved jar
//! - `ReferenceManifest`: The `mavenref.yaml` project manifest

pub mod coordinate;
pub mod error;
pub mod graph;
pub mod item;
pub mod manifest;

pub use coordinate::{Coordinate, DeclaredDependency, Exclusion, RepositoryDescriptor, Scope};
pub use error::{CoreError, Result};
pub use graph::{
    ArenaEdge, ArenaNode, DependencyEdge, DependencyNode, GraphArena, ResolvedArtifact, JAR_EXTENSION,
};
pub use item::{ItemDefaults, OutputItem, coarse_version, item_spec};
pub use manifest::{ReferenceManifest, ResolveSettings, MANIFEST_FILE};
