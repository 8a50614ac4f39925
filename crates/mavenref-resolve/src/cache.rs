//! Resolved graph cache
//!
//! Key features:
//! - Structural keys: unordered dependency and repository sets, not request order
//! - Soft failures: unreadable or unwritable caches degrade to a miss
//! - Wholesale replacement: a snapshot is never patched in place

use chrono::{DateTime, Utc};
use mavenref_core::{DeclaredDependency, DependencyNode, RepositoryDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ResolveError, Result};

/// Snapshot format understood by this build
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Persisted request + resolved graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    /// Snapshot format version
    #[serde(default)]
    pub version: u32,

    /// When this snapshot was written
    #[serde(default = "Utc::now")]
    pub generated: DateTime<Utc>,

    /// Whether the graph was resolved with test scope admitted
    #[serde(default)]
    pub include_test_scope: bool,

    /// Requested top-level dependencies
    #[serde(default)]
    pub dependencies: Option<Vec<DeclaredDependency>>,

    /// Repositories the graph was resolved against
    #[serde(default)]
    pub repositories: Option<Vec<RepositoryDescriptor>>,

    /// The resolved graph
    #[serde(default)]
    pub graph: Option<DependencyNode>,
}

/// Why a snapshot could not be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMiss {
    FormatVersion,
    NoGraph,
    TestScope,
    Repositories,
    Dependencies,
}

impl fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatVersion => write!(f, "format version changed"),
            Self::NoGraph => write!(f, "no graph stored"),
            Self::TestScope => write!(f, "test scope setting changed"),
            Self::Repositories => write!(f, "repository set changed"),
            Self::Dependencies => write!(f, "dependency set changed"),
        }
    }
}

impl CacheSnapshot {
    pub fn new(
        dependencies: &[DeclaredDependency],
        repositories: &[RepositoryDescriptor],
        include_test_scope: bool,
        graph: DependencyNode,
    ) -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            generated: Utc::now(),
            include_test_scope,
            dependencies: Some(dependencies.to_vec()),
            repositories: Some(repositories.to_vec()),
            graph: Some(graph),
        }
    }

    /// First reason this snapshot does not apply to the request, if any
    pub fn miss_reason(
        &self,
        dependencies: &[DeclaredDependency],
        repositories: &[RepositoryDescriptor],
        include_test_scope: bool,
    ) -> Option<CacheMiss> {
        if self.version != CACHE_FORMAT_VERSION {
            return Some(CacheMiss::FormatVersion);
        }
        if self.graph.is_none() {
            return Some(CacheMiss::NoGraph);
        }
        if self.include_test_scope != include_test_scope {
            return Some(CacheMiss::TestScope);
        }

        let repos_match = self
            .repositories
            .as_deref()
            .is_some_and(|stored| unordered_eq(repositories, stored, |a, b| a == b));
        if !repos_match {
            return Some(CacheMiss::Repositories);
        }

        let deps_match = self
            .dependencies
            .as_deref()
            .is_some_and(|stored| unordered_eq(dependencies, stored, |a, b| a.same_request(b)));
        if !deps_match {
            return Some(CacheMiss::Dependencies);
        }

        None
    }

    /// Whether this snapshot can stand in for an oracle call
    pub fn matches(
        &self,
        dependencies: &[DeclaredDependency],
        repositories: &[RepositoryDescriptor],
        include_test_scope: bool,
    ) -> bool {
        self.miss_reason(dependencies, repositories, include_test_scope)
            .is_none()
    }

    /// Take the graph out of a snapshot that matched
    pub fn into_graph(self) -> Option<DependencyNode> {
        self.graph
    }
}

/// Same cardinality, and every element of each side has an equal on the other
fn unordered_eq<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len()
        && a.iter().all(|x| b.iter().any(|y| eq(x, y)))
        && b.iter().all(|y| a.iter().any(|x| eq(x, y)))
}

/// File-backed snapshot store. A store without a path is disabled.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    path: Option<PathBuf>,
}

impl CacheStore {
    /// Store at `path`; `None` or an empty path disables caching
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Self {
        Self {
            path: path
                .map(|p| p.as_ref().to_path_buf())
                .filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Read the snapshot. A missing file or a disabled store is `Ok(None)`.
    pub fn read(&self) -> Result<Option<CacheSnapshot>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let read_err = |message: String| ResolveError::CacheRead {
            path: path.display().to_string(),
            message,
        };
        let file = File::open(path).map_err(|e| read_err(e.to_string()))?;
        let snapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| read_err(e.to_string()))?;
        Ok(Some(snapshot))
    }

    /// Read the snapshot, treating any failure as absent
    pub fn try_read(&self) -> Option<CacheSnapshot> {
        match self.read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Ignoring unreadable resolution cache: {}", e);
                None
            }
        }
    }

    /// Replace the stored snapshot
    pub fn write(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let write_err = |message: String| ResolveError::CacheWrite {
            path: path.display().to_string(),
            message,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot).map_err(|e| write_err(e.to_string()))?;
        writer.flush().map_err(|e| write_err(e.to_string()))?;
        Ok(())
    }

    /// Best-effort write; failures are logged
    pub fn try_write(&self, snapshot: &CacheSnapshot) {
        if let Err(e) = self.write(snapshot) {
            tracing::warn!("Could not write resolution cache: {}", e);
        }
    }

    /// Delete the cache file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match &self.path {
            Some(path) if path.exists() => {
                std::fs::remove_file(path)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavenref_core::{Coordinate, ResolvedArtifact, Scope};
    use tempfile::TempDir;

    fn dep(name: &str, version: &str) -> DeclaredDependency {
        DeclaredDependency::new(Coordinate::new("org.example", name, version), Scope::Compile)
    }

    fn graph() -> DependencyNode {
        DependencyNode::root().child(
            Scope::Compile,
            DependencyNode::with_artifact(ResolvedArtifact::jar(
                &Coordinate::new("org.example", "a", "1.0"),
                None,
            )),
        )
    }

    fn repos() -> Vec<RepositoryDescriptor> {
        vec![
            RepositoryDescriptor::central(),
            RepositoryDescriptor::new("internal", "https://maven.example.com/releases"),
        ]
    }

    #[test]
    fn test_snapshot_matches_permutations() {
        let deps = vec![dep("a", "1.0"), dep("b", "2.0")];
        let snapshot = CacheSnapshot::new(&deps, &repos(), false, graph());

        let mut shuffled_deps = deps.clone();
        shuffled_deps.reverse();
        let mut shuffled_repos = repos();
        shuffled_repos.reverse();

        assert!(snapshot.matches(&shuffled_deps, &shuffled_repos, false));
    }

    #[test]
    fn test_snapshot_rejects_version_change() {
        let deps = vec![dep("a", "1.0"), dep("b", "2.0")];
        let snapshot = CacheSnapshot::new(&deps, &repos(), false, graph());

        let changed = vec![dep("a", "1.0"), dep("b", "2.1")];
        assert_eq!(
            snapshot.miss_reason(&changed, &repos(), false),
            Some(CacheMiss::Dependencies)
        );
    }

    #[test]
    fn test_snapshot_rejects_cardinality_change() {
        let deps = vec![dep("a", "1.0")];
        let snapshot = CacheSnapshot::new(&deps, &repos(), false, graph());

        let doubled = vec![dep("a", "1.0"), dep("a", "1.0")];
        assert_eq!(
            snapshot.miss_reason(&doubled, &repos(), false),
            Some(CacheMiss::Dependencies)
        );
        assert_eq!(
            snapshot.miss_reason(&deps, &repos()[..1], false),
            Some(CacheMiss::Repositories)
        );
    }

    #[test]
    fn test_snapshot_rejects_repository_url_change() {
        let deps = vec![dep("a", "1.0")];
        let snapshot = CacheSnapshot::new(&deps, &repos(), false, graph());

        let mut moved = repos();
        moved[1].url = "https://maven.example.com/snapshots".to_string();
        assert!(!snapshot.matches(&deps, &moved, false));
    }

    #[test]
    fn test_snapshot_rejects_other_format_or_missing_graph() {
        let deps = vec![dep("a", "1.0")];
        let mut snapshot = CacheSnapshot::new(&deps, &repos(), false, graph());
        snapshot.version = 2;
        assert_eq!(
            snapshot.miss_reason(&deps, &repos(), false),
            Some(CacheMiss::FormatVersion)
        );

        snapshot.version = CACHE_FORMAT_VERSION;
        snapshot.graph = None;
        assert_eq!(
            snapshot.miss_reason(&deps, &repos(), false),
            Some(CacheMiss::NoGraph)
        );
    }

    #[test]
    fn test_snapshot_rejects_test_scope_toggle() {
        let deps = vec![dep("a", "1.0")];
        let snapshot = CacheSnapshot::new(&deps, &repos(), false, graph());
        assert_eq!(
            snapshot.miss_reason(&deps, &repos(), true),
            Some(CacheMiss::TestScope)
        );
    }

    #[test]
    fn test_store_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(Some(&dir.path().join("obj/cache.json")));

        let deps = vec![dep("a", "1.0")];
        store.write(&CacheSnapshot::new(&deps, &repos(), false, graph())).unwrap();

        let snapshot = store.read().unwrap().unwrap();
        assert_eq!(snapshot.version, CACHE_FORMAT_VERSION);
        assert!(snapshot.matches(&deps, &repos(), false));
        assert_eq!(snapshot.into_graph().unwrap(), graph());
    }

    #[test]
    fn test_store_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(Some(&dir.path().join("absent.json")));
        assert!(store.read().unwrap().is_none());
        assert!(store.try_read().is_none());
    }

    #[test]
    fn test_store_corrupt_file_degrades_to_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = CacheStore::new(Some(&path));
        assert!(matches!(store.read(), Err(ResolveError::CacheRead { .. })));
        assert!(store.try_read().is_none());
    }

    #[test]
    fn test_store_malformed_graph_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let store = CacheStore::new(Some(&path));
        store.write(&CacheSnapshot::new(&[dep("a", "1.0")], &repos(), false, graph())).unwrap();

        // point the root's child back at the root
        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        json["graph"]["nodes"][0]["children"][0]["node"] = serde_json::json!(0);
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        match store.read() {
            Err(ResolveError::CacheRead { message, .. }) => assert!(message.contains("node 0")),
            other => panic!("expected CacheRead, got {other:?}"),
        }
        assert!(store.try_read().is_none());
    }

    #[test]
    fn test_disabled_store_is_noop() {
        let store = CacheStore::new(Some(Path::new("")));
        assert!(!store.is_enabled());

        store.try_write(&CacheSnapshot::new(&[], &[], false, graph()));
        assert!(store.try_read().is_none());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_unwritable_location_is_soft() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let store = CacheStore::new(Some(&blocker.join("cache.json")));
        let snapshot = CacheSnapshot::new(&[], &[], false, graph());
        assert!(matches!(store.write(&snapshot), Err(ResolveError::CacheWrite { .. })));
        store.try_write(&snapshot);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(Some(&dir.path().join("cache.json")));
        store.write(&CacheSnapshot::new(&[], &[], false, graph())).unwrap();

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }
}
