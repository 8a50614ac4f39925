//! Project manifest (`mavenref.yaml`) definition and loading

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coordinate::{DeclaredDependency, RepositoryDescriptor};
use crate::error::{CoreError, Result};
use crate::item::ItemDefaults;

/// Default manifest file name inside a project directory
pub const MANIFEST_FILE: &str = "mavenref.yaml";

const API_VERSION: &str = "mavenref/v1";

/// Declared Maven references of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceManifest {
    /// API version (mavenref/v1)
    pub api_version: String,

    /// Remote repositories, Maven Central when omitted
    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryDescriptor>,

    /// Top-level references
    #[serde(default)]
    pub references: Vec<DeclaredDependency>,

    /// Resolution settings
    #[serde(default)]
    pub settings: ResolveSettings,
}

fn default_repositories() -> Vec<RepositoryDescriptor> {
    vec![RepositoryDescriptor::central()]
}

/// Per-run resolution settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSettings {
    /// Debug flag copied onto every generated item
    #[serde(default)]
    pub debug: bool,

    /// Signing key copied onto every generated item
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Class loader copied onto every generated item
    #[serde(default)]
    pub class_loader: Option<String>,

    /// Admit test-scoped dependencies
    #[serde(default)]
    pub include_test_scope: bool,

    /// Look up `sources` jars for every item (best effort)
    #[serde(default)]
    pub include_sources: bool,

    /// Graph cache location; unset or empty disables caching
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

impl ResolveSettings {
    pub fn item_defaults(&self) -> ItemDefaults {
        ItemDefaults {
            debug: self.debug,
            key_file: self.key_file.clone(),
            class_loader: self.class_loader.clone(),
        }
    }

    /// Cache file, `None` when caching is disabled
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

impl ReferenceManifest {
    /// Parse and validate a manifest from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest from a file, or from `mavenref.yaml` inside a directory.
    ///
    /// Relative `keyFile` and `cacheFile` paths are resolved against the
    /// manifest's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = if path.is_dir() {
            path.join(MANIFEST_FILE)
        } else {
            path.to_path_buf()
        };

        if !file.exists() {
            return Err(CoreError::ManifestNotFound {
                path: file.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&file)?;
        let mut manifest = Self::from_yaml(&content)?;

        if let Some(base) = file.parent() {
            manifest.settings.key_file = manifest.settings.key_file.map(|p| rebase(base, p));
            manifest.settings.cache_file = manifest.settings.cache_file.map(|p| rebase(base, p));
        }

        Ok(manifest)
    }

    /// Check the API version and every reference's identity
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(CoreError::InvalidManifest {
                message: format!(
                    "Unsupported API version: {}. Expected: {}",
                    self.api_version, API_VERSION
                ),
            });
        }

        for repo in &self.repositories {
            if repo.id.trim().is_empty() || repo.url.trim().is_empty() {
                return Err(CoreError::InvalidManifest {
                    message: format!("Repository entries need an id and a url: {:?}", repo),
                });
            }
        }

        for reference in &self.references {
            reference.validate()?;
        }

        Ok(())
    }
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.as_os_str().is_empty() || path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Scope;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"apiVersion: mavenref/v1
repositories:
  - id: central
    url: https://repo.maven.apache.org/maven2/
references:
  - groupId: com.google.guava
    artifactId: guava
    version: 31.1-jre
  - groupId: javax.servlet
    artifactId: servlet-api
    version: "2.5"
    scope: provided
    optional: true
settings:
  debug: true
  classLoader: AppDomainAssemblyClassLoader
  cacheFile: obj/mavenref.cache.json
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = ReferenceManifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.repositories.len(), 1);
        assert_eq!(manifest.references.len(), 2);
        assert_eq!(manifest.references[0].scope, Scope::Compile);
        assert_eq!(manifest.references[1].scope, Scope::Provided);
        assert!(manifest.references[1].optional);
        assert!(manifest.settings.debug);
        assert!(!manifest.settings.include_test_scope);
    }

    #[test]
    fn test_default_repositories() {
        let manifest = ReferenceManifest::from_yaml("apiVersion: mavenref/v1\n").unwrap();
        assert_eq!(manifest.repositories, vec![RepositoryDescriptor::central()]);
        assert!(manifest.references.is_empty());
    }

    #[test]
    fn test_wrong_api_version() {
        let err = ReferenceManifest::from_yaml("apiVersion: other/v2\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidManifest { .. }));
    }

    #[test]
    fn test_blank_reference_rejected() {
        let yaml = r#"apiVersion: mavenref/v1
references:
  - groupId: ""
    artifactId: guava
    version: "1.0"
"#;
        let err = ReferenceManifest::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, CoreError::InvalidIdentity { field: "groupId", .. }));
    }

    #[test]
    fn test_load_from_directory_rebases_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), MANIFEST).unwrap();

        let manifest = ReferenceManifest::load(dir.path()).unwrap();
        assert_eq!(
            manifest.settings.cache_path(),
            Some(dir.path().join("obj/mavenref.cache.json").as_path())
        );
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = ReferenceManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_empty_cache_path_disables_cache() {
        let settings = ResolveSettings {
            cache_file: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(settings.cache_path().is_none());
    }
}
