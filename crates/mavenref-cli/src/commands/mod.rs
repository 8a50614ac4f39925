//! CLI commands

pub mod cache;
pub mod resolve;
pub mod tree;

use mavenref_core::ReferenceManifest;
use mavenref_resolve::{IndexResolver, Session};
use std::path::PathBuf;

use crate::error::Result;

/// Inputs shared by the commands that resolve a graph
pub struct ResolveOptions {
    pub manifest: PathBuf,
    pub index: PathBuf,
    pub local_repository: Option<PathBuf>,
    pub cache_file: Option<PathBuf>,
    pub no_cache: bool,
    pub include_test: bool,
}

impl ResolveOptions {
    /// Load the manifest and apply command line overrides to its settings
    pub fn load_manifest(&self) -> Result<ReferenceManifest> {
        let mut manifest = ReferenceManifest::load(&self.manifest)?;
        let settings = &mut manifest.settings;

        if self.no_cache {
            settings.cache_file = None;
        } else if let Some(cache_file) = &self.cache_file {
            settings.cache_file = Some(cache_file.clone());
        }
        if self.include_test {
            settings.include_test_scope = true;
        }

        tracing::debug!(
            "Loaded {} references from {}",
            manifest.references.len(),
            self.manifest.display()
        );
        Ok(manifest)
    }

    pub fn oracle(&self) -> Result<IndexResolver> {
        Ok(IndexResolver::from_path(&self.index)?)
    }

    pub fn session(&self) -> Session {
        Session {
            local_repository: self.local_repository.clone(),
        }
    }
}
