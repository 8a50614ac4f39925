//! Offline artifact index and the oracle built on it
//!
//! An index lists artifacts, where their files live and what each one
//! depends on. [`IndexResolver`] expands a request against it the way Maven
//! collects a graph: scopes are derived down the tree, transitive test,
//! provided and optional dependencies are not followed, and exclusions are
//! inherited. It performs no version mediation; every requested version
//! must be present.

use mavenref_core::{
    Coordinate, DeclaredDependency, DependencyEdge, DependencyNode, Exclusion, JAR_EXTENSION,
    RepositoryDescriptor, ResolvedArtifact, Scope,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ResolveError, Result};
use crate::oracle::{GraphResolver, ScopeFilter, Session};

/// Artifact index file (index.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactIndex {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Root of the Maven-layout file store
    #[serde(default)]
    pub local_repository: Option<PathBuf>,

    /// Indexed artifacts
    #[serde(default)]
    pub artifacts: Vec<IndexEntry>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_extension() -> String {
    JAR_EXTENSION.to_string()
}

/// A single indexed artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    pub version: String,

    /// Explicit file; derived from the Maven layout when absent
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Id of the only repository serving this artifact
    #[serde(default)]
    pub repository: Option<String>,

    /// Declared dependencies (the artifact's POM)
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
}

impl IndexEntry {
    pub fn coordinate(&self) -> Coordinate {
        let coordinate = Coordinate::new(&self.group_id, &self.artifact_id, &self.version);
        match self.classifier.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(classifier) => coordinate.with_classifier(classifier),
            None => coordinate,
        }
    }

    fn served_by(&self, repositories: &[RepositoryDescriptor]) -> bool {
        match &self.repository {
            Some(id) => repositories.iter().any(|r| &r.id == id),
            None => true,
        }
    }

    /// Relative path in a Maven-layout repository
    pub fn layout_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group_id.split('.').collect();
        path.push(&self.artifact_id);
        path.push(&self.version);

        let mut file_name = format!("{}-{}", self.artifact_id, self.version);
        if let Some(classifier) = self.coordinate().classifier() {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        file_name.push('.');
        file_name.push_str(&self.extension);
        path.push(file_name);
        path
    }
}

impl ArtifactIndex {
    /// Parse index from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ResolveError::InvalidIndex {
            message: e.to_string(),
        })
    }

    /// Load index from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// `~/.m2/repository`
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".m2")
        .join("repository")
}

/// Effective scope of a transitive dependency given its parent's scope
pub fn derive_scope(parent: Scope, child: Scope) -> Scope {
    if matches!(child, Scope::System | Scope::Test) {
        return child;
    }
    match parent {
        Scope::Compile => child,
        Scope::Runtime | Scope::Test => parent,
        Scope::Provided | Scope::System => Scope::Provided,
        Scope::Import => Scope::Runtime,
    }
}

/// Inputs shared by one graph expansion
struct Expansion<'a> {
    repositories: &'a [RepositoryDescriptor],
    filter: &'a ScopeFilter,
    local_repository: &'a Path,
}

/// Oracle answering from an [`ArtifactIndex`]
#[derive(Debug, Clone)]
pub struct IndexResolver {
    entries: HashMap<Coordinate, IndexEntry>,
    local_repository: PathBuf,
    base_dir: Option<PathBuf>,
}

impl IndexResolver {
    pub fn new(index: ArtifactIndex) -> Result<Self> {
        let local_repository = index
            .local_repository
            .clone()
            .unwrap_or_else(default_local_repository);

        let mut entries = HashMap::new();
        for entry in index.artifacts {
            let coordinate = entry.coordinate();
            coordinate.validate()?;
            for dep in &entry.dependencies {
                dep.validate()?;
            }
            if entries.contains_key(&coordinate) {
                return Err(ResolveError::InvalidIndex {
                    message: format!("Duplicate artifact {}", coordinate),
                });
            }
            entries.insert(coordinate, entry);
        }

        Ok(Self {
            entries,
            local_repository,
            base_dir: None,
        })
    }

    /// Load an index file; relative paths in it resolve against its directory
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut resolver = Self::new(ArtifactIndex::load(path)?)?;
        resolver.base_dir = path.parent().map(Path::to_path_buf);
        if let Some(base) = &resolver.base_dir
            && resolver.local_repository.is_relative()
        {
            resolver.local_repository = base.join(&resolver.local_repository);
        }
        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(
        &self,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
    ) -> Option<&IndexEntry> {
        self.entries
            .get(coordinate)
            .filter(|entry| entry.served_by(repositories))
    }

    fn artifact(&self, entry: &IndexEntry, local_repository: &Path) -> ResolvedArtifact {
        let file = match &entry.file {
            Some(file) if file.is_relative() => match &self.base_dir {
                Some(base) => base.join(file),
                None => file.clone(),
            },
            Some(file) => file.clone(),
            None => local_repository.join(entry.layout_path()),
        };

        ResolvedArtifact {
            group_id: entry.group_id.clone(),
            artifact_id: entry.artifact_id.clone(),
            classifier: entry.coordinate().classifier,
            extension: entry.extension.clone(),
            version: entry.version.clone(),
            file: Some(file),
        }
    }

    fn expand(
        &self,
        cx: &Expansion<'_>,
        dep: &DeclaredDependency,
        scope: Scope,
        exclusions: &[Exclusion],
        path: &mut Vec<Coordinate>,
    ) -> Result<Option<DependencyEdge>> {
        let coordinate = dep.coordinate();
        if path.contains(&coordinate) {
            tracing::debug!("Skipping cyclic dependency on {}", coordinate);
            return Ok(None);
        }

        let entry = self.lookup(&coordinate, cx.repositories).ok_or_else(|| {
            let chain: Vec<String> = path.iter().map(ToString::to_string).collect();
            let via = if chain.is_empty() {
                String::new()
            } else {
                format!(" (required by {})", chain.join(" -> "))
            };
            ResolveError::graph(format!("Could not find artifact {}{}", coordinate, via))
        })?;

        let mut node = DependencyNode::with_artifact(self.artifact(entry, cx.local_repository));

        let mut inherited = exclusions.to_vec();
        inherited.extend(dep.exclusions.iter().cloned());

        path.push(coordinate);
        for child in &entry.dependencies {
            if child.optional || matches!(child.scope, Scope::Test | Scope::Provided) {
                continue;
            }
            if dep.is_excluded(&child.group_id, &child.artifact_id)
                || exclusions
                    .iter()
                    .any(|e| e.matches(&child.group_id, &child.artifact_id))
            {
                continue;
            }
            let derived = derive_scope(scope, child.scope);
            if !cx.filter.accepts(derived) {
                continue;
            }
            if let Some(edge) = self.expand(cx, child, derived, &inherited, path)? {
                node.children.push(edge);
            }
        }
        path.pop();

        Ok(Some(DependencyEdge {
            scope,
            optional: dep.optional,
            node,
        }))
    }
}

impl GraphResolver for IndexResolver {
    fn resolve_full_graph(
        &self,
        session: &Session,
        request: &[DeclaredDependency],
        repositories: &[RepositoryDescriptor],
        filter: &ScopeFilter,
    ) -> Result<DependencyNode> {
        for dep in request {
            dep.validate()?;
        }

        let local_repository = session
            .local_repository
            .as_deref()
            .unwrap_or(&self.local_repository);
        let cx = Expansion {
            repositories,
            filter,
            local_repository,
        };

        let mut root = DependencyNode::root();
        for dep in request {
            if !filter.accepts(dep.scope) {
                tracing::debug!("Not resolving {} ({} scope)", dep.coordinate(), dep.scope);
                continue;
            }
            let mut path = Vec::new();
            if let Some(edge) = self.expand(&cx, dep, dep.scope, &[], &mut path)? {
                root.children.push(edge);
            }
        }

        Ok(root)
    }

    fn resolve_artifact(
        &self,
        session: &Session,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
    ) -> Result<ResolvedArtifact> {
        let local_repository = session
            .local_repository
            .as_deref()
            .unwrap_or(&self.local_repository);

        self.lookup(coordinate, repositories)
            .map(|entry| self.artifact(entry, local_repository))
            .ok_or_else(|| ResolveError::ArtifactNotResolved {
                coordinate: coordinate.clone(),
            })
    }
}
